use config::{Config as ConfigBuilder, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AthenaError, AthenaResult};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TRAIN_URL: &str = "https://train-agent.vercel.app/train";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://agent-chat-alpha.vercel.app";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AthenaConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Auth service and connection test.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Agent CRUD service. Empty means `{api_base_url}/api`.
    #[serde(default)]
    pub creator_base_url: String,

    /// Full URL of the training upload endpoint.
    #[serde(default = "default_train_url")]
    pub train_url: String,

    /// Chat service (listing, history, turns).
    #[serde(default = "default_chat_base_url")]
    pub chat_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Session file. Empty means `<data_dir>/athena/session.json`.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

/// Endpoints after fallback resolution and URL validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoints {
    pub api: String,
    pub creator: String,
    pub train: String,
    pub chat: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_train_url() -> String {
    DEFAULT_TRAIN_URL.to_string()
}

fn default_chat_base_url() -> String {
    DEFAULT_CHAT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            creator_base_url: String::new(),
            train_url: default_train_url(),
            chat_base_url: default_chat_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl EndpointsConfig {
    /// The one place endpoint fallbacks are decided.
    ///
    /// The agent service lives at `creator_base_url` when it is configured and
    /// under `{api_base_url}/api` otherwise.
    pub fn resolve(&self) -> AthenaResult<ResolvedEndpoints> {
        let api = normalize_url("endpoints.api_base_url", &self.api_base_url)?;

        let creator = if self.creator_base_url.trim().is_empty() {
            format!("{}/api", api)
        } else {
            normalize_url("endpoints.creator_base_url", &self.creator_base_url)?
        };

        let train = normalize_url("endpoints.train_url", &self.train_url)?;
        let chat = normalize_url("endpoints.chat_base_url", &self.chat_base_url)?;

        Ok(ResolvedEndpoints {
            api,
            creator,
            train,
            chat,
        })
    }
}

fn normalize_url(key: &str, raw: &str) -> AthenaResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AthenaError::MissingConfig(key.to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| AthenaError::InvalidConfigValue {
        key: key.to_string(),
        message: format!("'{}' is not a valid URL: {}", trimmed, e),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AthenaError::InvalidConfigValue {
            key: key.to_string(),
            message: format!("Must be an http(s) URL, got scheme '{}'", url.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

impl AthenaConfig {
    pub fn load() -> AthenaResult<Self> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> AthenaResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ATHENA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut athena_config: AthenaConfig = builder.build()?.try_deserialize()?;
        athena_config.apply_env_overrides(|name| std::env::var(name).ok());
        athena_config.validate()?;

        Ok(athena_config)
    }

    /// Apply the flat `ATHENA_*` variables on top of file and nested env values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ATHENA_API_URL") {
            self.endpoints.api_base_url = url;
        }
        if let Some(url) = lookup("ATHENA_CREATOR_API_URL") {
            self.endpoints.creator_base_url = url;
        }
        if let Some(url) = lookup("ATHENA_TRAIN_API_URL") {
            self.endpoints.train_url = url;
        }
        if let Some(url) = lookup("ATHENA_CHAT_API_URL") {
            self.endpoints.chat_base_url = url;
        }
        if let Some(path) = lookup("ATHENA_SESSION_PATH") {
            self.session.path = path;
        }

        if let Some(level) = lookup("ATHENA_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> AthenaResult<()> {
        self.endpoints.resolve()?;

        if self.http.timeout_secs == 0 {
            return Err(AthenaError::InvalidConfigValue {
                key: "http.timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.http.connect_timeout_secs == 0 {
            return Err(AthenaError::InvalidConfigValue {
                key: "http.connect_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(AthenaError::InvalidConfigValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn endpoints(&self) -> AthenaResult<ResolvedEndpoints> {
        self.endpoints.resolve()
    }

    /// Where the session record lives.
    pub fn session_path(&self) -> AthenaResult<PathBuf> {
        if !self.session.path.trim().is_empty() {
            return Ok(PathBuf::from(self.session.path.trim()));
        }

        get_data_dir()
            .map(|d| d.join("session.json"))
            .ok_or_else(|| AthenaError::MissingConfig("session.path".to_string()))
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("athena.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".athena").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".athena").join(".env"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    for path in paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("athena"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("athena"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AthenaConfig::default();

        assert_eq!(config.endpoints.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.endpoints.creator_base_url.is_empty());
        assert_eq!(config.endpoints.train_url, DEFAULT_TRAIN_URL);
        assert_eq!(config.endpoints.chat_base_url, DEFAULT_CHAT_BASE_URL);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_creator_falls_back_to_api_prefix() {
        let mut endpoints = EndpointsConfig::default();
        endpoints.api_base_url = "https://api.example.edu/".to_string();

        let resolved = endpoints.resolve().unwrap();
        assert_eq!(resolved.api, "https://api.example.edu");
        assert_eq!(resolved.creator, "https://api.example.edu/api");
    }

    #[test]
    fn test_explicit_creator_wins() {
        let mut endpoints = EndpointsConfig::default();
        endpoints.creator_base_url = "https://creator.example.edu".to_string();

        let resolved = endpoints.resolve().unwrap();
        assert_eq!(resolved.creator, "https://creator.example.edu");
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let mut endpoints = EndpointsConfig::default();
        endpoints.chat_base_url = "ftp://chat.example.edu".to_string();
        assert!(endpoints.resolve().is_err());

        let mut endpoints = EndpointsConfig::default();
        endpoints.api_base_url = "   ".to_string();
        assert!(matches!(
            endpoints.resolve(),
            Err(AthenaError::MissingConfig(_))
        ));

        let mut endpoints = EndpointsConfig::default();
        endpoints.train_url = "not a url".to_string();
        assert!(endpoints.resolve().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ATHENA_API_URL", "https://auth.example.edu"),
            ("ATHENA_CHAT_API_URL", "https://chat.example.edu"),
            ("ATHENA_SESSION_PATH", "/tmp/athena-session.json"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AthenaConfig::default();
        config.apply_env_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.endpoints.api_base_url, "https://auth.example.edu");
        assert_eq!(config.endpoints.chat_base_url, "https://chat.example.edu");
        assert_eq!(config.endpoints.train_url, DEFAULT_TRAIN_URL);
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/tmp/athena-session.json")
        );
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_athena_log_level_beats_rust_log() {
        let mut config = AthenaConfig::default();
        config.apply_env_overrides(|name| match name {
            "ATHENA_LOG_LEVEL" => Some("info".to_string()),
            "RUST_LOG" => Some("trace".to_string()),
            _ => None,
        });
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = AthenaConfig::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_log_levels() {
        let mut config = AthenaConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "athena_core=debug,reqwest=warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("athena.toml");
        std::fs::write(
            &path,
            r#"
[endpoints]
creator_base_url = "https://creator.example.edu"

[http]
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = AthenaConfig::load_from_paths(vec![path]).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert!(!config.endpoints.creator_base_url.is_empty());
    }

    #[test]
    fn test_data_dir_helper() {
        assert!(get_data_dir().is_some());
    }
}
