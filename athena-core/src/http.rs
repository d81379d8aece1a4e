//! Shared HTTP transport for every Athena service.
//!
//! One `reqwest::Client` (and so one connection pool) backs all resource
//! clients. Non-2xx responses are turned into [`AthenaError::ApiStatus`] with the
//! server's `message` (else `error`) when the body carries one.

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{AthenaError, AthenaResult};

/// The `{success, message, error, data}` wrapper most Athena services reply with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Only an explicit `success: false` counts as a failure.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// `message`, else `error`.
    pub fn server_message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

/// A response whose body has been read but not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `message`, else `error`, from a JSON error body. Non-JSON bodies yield `None`.
    pub fn server_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .find(|m| !m.trim().is_empty())
            .map(String::from)
    }

    /// Decode the body. An empty body decodes as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> AthenaResult<T> {
        let body = if self.body.trim().is_empty() {
            "{}"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| AthenaError::ApiParseError(e.to_string()))
    }

    /// Map a non-2xx response to an error, or decode a 2xx body.
    pub fn into_result<T: DeserializeOwned>(self) -> AthenaResult<T> {
        if !self.is_success() {
            return Err(AthenaError::from_status(
                self.status.as_u16(),
                self.server_message(),
            ));
        }
        self.json()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(config: &HttpConfig) -> AthenaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("athena/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AthenaError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AthenaResult<T> {
        self.send_json::<T, ()>(Method::GET, url, query, None).await
    }

    pub async fn send_json<T, B>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> AthenaResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        debug!(%method, url, "Sending request");
        self.execute(request).await?.into_result()
    }

    pub async fn post_multipart(&self, url: &str, form: Form) -> AthenaResult<RawResponse> {
        debug!(url, "Sending multipart upload");
        self.execute(self.client.post(url).multipart(form)).await
    }

    /// Send the request and read the whole body, whatever the status.
    pub async fn execute(&self, request: RequestBuilder) -> AthenaResult<RawResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_server_message_prefers_message_over_error() {
        let response = raw(400, r#"{"message": "Domain is required", "error": "bad"}"#);
        assert_eq!(response.server_message().as_deref(), Some("Domain is required"));

        let response = raw(400, r#"{"error": "bad"}"#);
        assert_eq!(response.server_message().as_deref(), Some("bad"));

        let response = raw(502, "<html>Bad gateway</html>");
        assert!(response.server_message().is_none());
    }

    #[test]
    fn test_non_success_maps_to_status_error() {
        let err = raw(500, "").into_result::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("HTTP error! status: 500"));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = raw(200, "{not json")
            .into_result::<Envelope<Vec<u32>>>()
            .unwrap_err();
        assert!(matches!(err, AthenaError::ApiParseError(_)));
    }

    #[test]
    fn test_empty_body_decodes_as_empty_envelope() {
        let envelope: Envelope<Vec<u32>> = raw(200, "").into_result().unwrap();
        assert!(envelope.data.is_none());
        assert!(!envelope.is_failure());
    }

    #[test]
    fn test_envelope_failure_message() {
        let envelope: Envelope<()> =
            serde_json::from_str(r#"{"success": false, "error": "Invalid credentials"}"#).unwrap();
        assert!(envelope.is_failure());
        assert_eq!(envelope.server_message().as_deref(), Some("Invalid credentials"));
    }
}
