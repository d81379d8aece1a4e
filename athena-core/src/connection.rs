use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::{AthenaError, AthenaResult};
use crate::http::ApiClient;

/// Result of probing the main API with `GET /test/users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub data: Vec<Value>,
}

impl ConnectionReport {
    /// `count` when the server sent one, else the number of users returned.
    pub fn user_count(&self) -> u64 {
        self.count.unwrap_or(self.data.len() as u64)
    }
}

pub async fn test_connection(
    http: &Arc<ApiClient>,
    api_base_url: &str,
) -> AthenaResult<ConnectionReport> {
    let url = format!("{}/test/users", api_base_url);
    let response = http.execute(http.request(Method::GET, &url)).await?;
    if !response.is_success() {
        return Err(AthenaError::from_status(response.status.as_u16(), None));
    }
    let report: ConnectionReport = response.json()?;
    info!(
        success = report.success,
        users = report.user_count(),
        "Connection test finished"
    );
    Ok(report)
}
