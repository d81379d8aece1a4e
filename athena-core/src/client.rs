use std::sync::Arc;

use crate::agents::{AgentCatalog, AgentsClient};
use crate::auth::AuthClient;
use crate::chat::ChatClient;
use crate::config::{AthenaConfig, HttpConfig, ResolvedEndpoints};
use crate::connection::{self, ConnectionReport};
use crate::error::AthenaResult;
use crate::http::ApiClient;
use crate::training::TrainingUploader;

/// Entry point bundling one client per Athena service over a shared HTTP pool.
///
/// ```rust,ignore
/// let config = AthenaConfig::load()?;
/// let client = AthenaClient::new(&config)?;
/// let route = client.auth().login(&mut session, "T001", "secret").await?;
/// ```
#[derive(Debug, Clone)]
pub struct AthenaClient {
    endpoints: ResolvedEndpoints,
    http: Arc<ApiClient>,
    auth: AuthClient,
    agents: AgentsClient,
    training: TrainingUploader,
    chat: ChatClient,
}

impl AthenaClient {
    pub fn new(config: &AthenaConfig) -> AthenaResult<Self> {
        Self::from_endpoints(config.endpoints()?, &config.http)
    }

    pub fn from_endpoints(endpoints: ResolvedEndpoints, http: &HttpConfig) -> AthenaResult<Self> {
        let http = Arc::new(ApiClient::new(http)?);
        Ok(Self {
            auth: AuthClient::new(Arc::clone(&http), endpoints.api.clone()),
            agents: AgentsClient::new(Arc::clone(&http), endpoints.creator.clone()),
            training: TrainingUploader::new(Arc::clone(&http), endpoints.train.clone()),
            chat: ChatClient::new(Arc::clone(&http), endpoints.chat.clone()),
            endpoints,
            http,
        })
    }

    pub fn endpoints(&self) -> &ResolvedEndpoints {
        &self.endpoints
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn agents(&self) -> &AgentsClient {
        &self.agents
    }

    pub fn training(&self) -> &TrainingUploader {
        &self.training
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// A fresh, unloaded catalog for one creator.
    pub fn catalog(&self, creator_id: impl Into<String>) -> AgentCatalog {
        AgentCatalog::new(self.agents.clone(), creator_id)
    }

    pub async fn test_connection(&self) -> AthenaResult<ConnectionReport> {
        connection::test_connection(&self.http, &self.endpoints.api).await
    }
}
