//! Error types for the Athena core library.
//!
//! Every failure surfaced to a user goes through [`AthenaError`]. Nothing here is
//! fatal: callers show the message and the user re-issues the action.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Config | Environment, config file, and endpoint errors |
//! | E2001-E2099 | Auth/Session | Login, session storage, and route access errors |
//! | E3001-E3099 | Agent | Agent lookup and agent management errors |
//! | E4001-E4099 | Chat | Chat session state errors |
//! | E5001-E5099 | API | Transport, HTTP status, and response parsing errors |
//! | E6001-E6099 | Training | Training document validation errors |
//! | E9001-E9099 | General | Internal, IO, serialization, and validation errors |

use std::fmt;
use thiserror::Error;

/// The main error type for the Athena core library.
#[derive(Debug, Error)]
pub enum AthenaError {
    // ========================================================================
    // Configuration Errors (E1001-E1099)
    // ========================================================================
    /// Required configuration value is missing
    #[error("[E1001] Missing required configuration: {0}")]
    MissingConfig(String),

    /// Configuration file parse error
    #[error("[E1002] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E1003] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Auth & Session Errors (E2001-E2099)
    // ========================================================================
    /// The auth service rejected the credentials
    #[error("[E2001] Login failed: {0}")]
    AuthenticationFailed(String),

    /// No user is signed in
    #[error("[E2002] Not signed in")]
    NotAuthenticated,

    /// The auth service returned a role this client does not know
    #[error("[E2003] Unknown role: {0}")]
    UnknownRole(String),

    /// Reading or writing the persisted session failed
    #[error("[E2004] Session storage error: {0}")]
    SessionStorage(String),

    /// The signed-in role may not open this view
    #[error("[E2005] Role '{role}' cannot access {route}")]
    RouteForbidden { role: String, route: String },

    // ========================================================================
    // Agent Errors (E3001-E3099)
    // ========================================================================
    /// Agent not found
    #[error("[E3001] Agent not found: {0}")]
    AgentNotFound(String),

    // ========================================================================
    // Chat Errors (E4001-E4099)
    // ========================================================================
    /// A message is still waiting for its reply
    #[error("[E4001] A message is already being sent")]
    MessageInFlight,

    /// The chat session was closed
    #[error("[E4002] Chat session is closed")]
    ChatClosed,

    /// The chat service answered with `success: false`
    #[error("[E4003] Chat service error: {0}")]
    ChatFailed(String),

    // ========================================================================
    // API Errors (E5001-E5099)
    // ========================================================================
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("[E5001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// Non-2xx response; `message` comes from the body when it carried one
    #[error("[E5002] {message}")]
    ApiStatus { status: u16, message: String },

    /// Response body could not be decoded
    #[error("[E5003] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// Service not reachable
    #[error("[E5004] API service unavailable: {0}")]
    ApiServiceUnavailable(String),

    /// Request timed out
    #[error("[E5005] Request timed out: {0}")]
    RequestTimeout(String),

    /// 2xx response carrying `success: false`
    #[error("[E5006] Request rejected: {0}")]
    ApiRejected(String),

    // ========================================================================
    // Training Errors (E6001-E6099)
    // ========================================================================
    /// Document is not an accepted type
    #[error("[E6001] Please select a PDF file: {0}")]
    UnsupportedFileType(String),

    /// Document exceeds the upload ceiling
    #[error("[E6002] File size must be less than {limit_mb}MB (got {size} bytes)")]
    FileTooLarge { size: u64, limit_mb: u64 },

    /// The training service rejected the upload
    #[error("[E6003] Upload failed: {0}")]
    UploadFailed(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// Client-side validation error
    #[error("[E9004] Validation error: {0}")]
    ValidationError(String),

    /// IO error
    #[error("[E9005] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9006] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Athena operations.
pub type AthenaResult<T> = Result<T, AthenaError>;

impl AthenaError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AthenaError::ValidationError(message.into())
    }

    /// Build the error for a non-2xx response from its status and optional server message.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        AthenaError::ApiStatus { status, message }
    }

    /// The HTTP status of the failed response, if the failure was a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            AthenaError::ApiStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for AthenaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AthenaError::RequestTimeout(err.to_string())
        } else if err.is_connect() {
            AthenaError::ApiServiceUnavailable(err.to_string())
        } else if err.is_status() {
            let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
            AthenaError::from_status(status, None)
        } else if err.is_decode() {
            AthenaError::ApiParseError(err.to_string())
        } else {
            AthenaError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AthenaError {
    fn from(err: serde_json::Error) -> Self {
        AthenaError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for AthenaError {
    fn from(err: std::io::Error) -> Self {
        AthenaError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for AthenaError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => AthenaError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => AthenaError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => AthenaError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => AthenaError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl AthenaError {
    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AthenaError::MissingConfig(_)
                | AthenaError::ConfigParseError(_)
                | AthenaError::InvalidConfigValue { .. }
        )
    }

    /// Returns true if this error was raised before any network call.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AthenaError::ValidationError(_)
                | AthenaError::UnsupportedFileType(_)
                | AthenaError::FileTooLarge { .. }
        )
    }

    /// Returns true if this error came back from (or on the way to) a remote service.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            AthenaError::ApiRequestFailed(_)
                | AthenaError::ApiStatus { .. }
                | AthenaError::ApiParseError(_)
                | AthenaError::ApiServiceUnavailable(_)
                | AthenaError::RequestTimeout(_)
                | AthenaError::ApiRejected(_)
        )
    }

    /// Returns true if re-issuing the same action might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AthenaError::ApiServiceUnavailable(_)
            | AthenaError::RequestTimeout(_)
            | AthenaError::ApiRequestFailed(_) => true,
            AthenaError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AthenaError::MissingConfig(_) => "E1001",
            AthenaError::ConfigParseError(_) => "E1002",
            AthenaError::InvalidConfigValue { .. } => "E1003",
            AthenaError::AuthenticationFailed(_) => "E2001",
            AthenaError::NotAuthenticated => "E2002",
            AthenaError::UnknownRole(_) => "E2003",
            AthenaError::SessionStorage(_) => "E2004",
            AthenaError::RouteForbidden { .. } => "E2005",
            AthenaError::AgentNotFound(_) => "E3001",
            AthenaError::MessageInFlight => "E4001",
            AthenaError::ChatClosed => "E4002",
            AthenaError::ChatFailed(_) => "E4003",
            AthenaError::ApiRequestFailed(_) => "E5001",
            AthenaError::ApiStatus { .. } => "E5002",
            AthenaError::ApiParseError(_) => "E5003",
            AthenaError::ApiServiceUnavailable(_) => "E5004",
            AthenaError::RequestTimeout(_) => "E5005",
            AthenaError::ApiRejected(_) => "E5006",
            AthenaError::UnsupportedFileType(_) => "E6001",
            AthenaError::FileTooLarge { .. } => "E6002",
            AthenaError::UploadFailed(_) => "E6003",
            AthenaError::Internal(_) => "E9001",
            AthenaError::ValidationError(_) => "E9004",
            AthenaError::IoError(_) => "E9005",
            AthenaError::SerializationError(_) => "E9006",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            AthenaError::NotAuthenticated => Some("Run 'athena login' to sign in"),
            AthenaError::AuthenticationFailed(_) => Some("Check your user id and password"),
            AthenaError::RouteForbidden { .. } => {
                Some("Run 'athena dashboard' to open the view for your role")
            }
            AthenaError::AgentNotFound(_) => Some("Run 'athena agents list' to see your agents"),
            AthenaError::ApiServiceUnavailable(_) => {
                Some("Check the endpoint URLs with 'athena config show'")
            }
            AthenaError::MissingConfig(_) | AthenaError::InvalidConfigValue { .. } => {
                Some("Set the value in athena.toml or the matching ATHENA_* variable")
            }
            AthenaError::UnsupportedFileType(_) => Some("Only PDF documents can be uploaded"),
            AthenaError::FileTooLarge { .. } => Some("Split the document into smaller PDFs"),
            _ => None,
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with suggestions.
pub struct CliErrorDisplay<'a> {
    error: &'a AthenaError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a AthenaError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            writeln!(f)?;
            writeln!(f, "  This error may be temporary. Try the command again.")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AthenaError::AgentNotFound("42".to_string());
        assert!(err.to_string().contains("E3001"));
        assert!(err.to_string().contains("42"));

        let err = AthenaError::FileTooLarge {
            size: 11 * 1024 * 1024,
            limit_mb: 10,
        };
        assert!(err.to_string().contains("less than 10MB"));
    }

    #[test]
    fn test_from_status_prefers_server_message() {
        let err = AthenaError::from_status(400, Some("Domain is required".to_string()));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Domain is required"));

        let err = AthenaError::from_status(503, None);
        assert!(err.to_string().contains("HTTP error! status: 503"));

        let err = AthenaError::from_status(500, Some("   ".to_string()));
        assert!(err.to_string().contains("HTTP error! status: 500"));
    }

    #[test]
    fn test_error_categorization() {
        assert!(AthenaError::validation("domain").is_validation_error());
        assert!(AthenaError::UnsupportedFileType("a.txt".to_string()).is_validation_error());
        assert!(!AthenaError::NotAuthenticated.is_validation_error());

        assert!(AthenaError::from_status(404, None).is_api_error());
        assert!(AthenaError::MissingConfig("endpoints.api_base_url".to_string()).is_config_error());
    }

    #[test]
    fn test_is_transient() {
        assert!(AthenaError::from_status(503, None).is_transient());
        assert!(AthenaError::from_status(429, None).is_transient());
        assert!(AthenaError::RequestTimeout("30s".to_string()).is_transient());
        assert!(!AthenaError::from_status(404, None).is_transient());
        assert!(!AthenaError::AuthenticationFailed("bad".to_string()).is_transient());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AthenaError::NotAuthenticated.error_code(), "E2002");
        assert_eq!(AthenaError::MessageInFlight.error_code(), "E4001");
        assert_eq!(AthenaError::from_status(500, None).error_code(), "E5002");
        assert_eq!(
            AthenaError::FileTooLarge {
                size: 1,
                limit_mb: 10
            }
            .error_code(),
            "E6002"
        );
        assert_eq!(AthenaError::Internal("x".to_string()).error_code(), "E9001");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AthenaError = io_err.into();
        assert!(matches!(err, AthenaError::IoError(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AthenaError = json_err.into();
        assert!(matches!(err, AthenaError::SerializationError(_)));
    }

    #[test]
    fn test_cli_error_display() {
        let err = AthenaError::NotAuthenticated;
        let output = CliErrorDisplay::new(&err).to_string();
        assert!(output.contains("Not signed in"));
        assert!(output.contains("Suggestion"));

        let output = CliErrorDisplay::new(&err).without_suggestion().to_string();
        assert!(!output.contains("Suggestion"));
    }
}
