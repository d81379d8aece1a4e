//! Agent management against the creator service.
//!
//! [`AgentsClient`] issues exactly one request per call. [`AgentCatalog`] holds
//! the list view state for one creator on top of it.

mod form;

pub use form::{
    AgentDraft, AgentForm, AgentPayload, FormMode, DEFAULT_REGION, TEMPERATURE_RANGE,
};

use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AthenaError, AthenaResult};
use crate::http::{ApiClient, Envelope};
use crate::models::{Agent, AgentId};

#[derive(Serialize)]
struct CloneVoiceRequest<'a> {
    user_id: &'a str,
    voice_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct AgentsClient {
    http: Arc<ApiClient>,
    base_url: String,
}

impl AgentsClient {
    pub fn new(http: Arc<ApiClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn agents_url(&self) -> String {
        format!("{}/creator/agents", self.base_url)
    }

    fn agent_url(&self, id: &AgentId) -> String {
        format!("{}/creator/agents/{}", self.base_url, id)
    }

    pub async fn list(&self, creator_id: &str) -> AthenaResult<Vec<Agent>> {
        let envelope: Envelope<Vec<Agent>> = self
            .http
            .get_json(&self.agents_url(), &[("creator_id", creator_id)])
            .await?;
        let agents = accepted(envelope)?.data.unwrap_or_default();
        debug!(creator_id, count = agents.len(), "Listed agents");
        Ok(agents)
    }

    /// Returns the stored agent when the service echoes it back.
    pub async fn create(&self, payload: &AgentPayload<'_>) -> AthenaResult<Option<Agent>> {
        let envelope: Envelope<Agent> = self
            .http
            .send_json(Method::POST, &self.agents_url(), &[], Some(payload))
            .await?;
        let created = accepted(envelope)?.data;
        info!(
            creator_id = payload.creator_id,
            id = ?created.as_ref().map(|a| a.id.as_str()),
            "Created agent"
        );
        Ok(created)
    }

    /// Full replace of the agent's editable fields.
    pub async fn update(
        &self,
        id: &AgentId,
        payload: &AgentPayload<'_>,
    ) -> AthenaResult<Option<Agent>> {
        let envelope: Envelope<Agent> = self
            .http
            .send_json(Method::PUT, &self.agent_url(id), &[], Some(payload))
            .await?;
        info!(%id, "Updated agent");
        Ok(accepted(envelope)?.data)
    }

    pub async fn delete(&self, id: &AgentId, creator_id: &str) -> AthenaResult<()> {
        let envelope: Envelope<serde_json::Value> = self
            .http
            .send_json::<_, ()>(
                Method::DELETE,
                &self.agent_url(id),
                &[("creator_id", creator_id)],
                None,
            )
            .await?;
        accepted(envelope)?;
        info!(%id, creator_id, "Deleted agent");
        Ok(())
    }

    /// Save the voice selection. Separate from the main create/update submit.
    pub async fn clone_voice(&self, user_id: &str, voice_id: &str) -> AthenaResult<()> {
        let voice_id = voice_id.trim();
        if voice_id.is_empty() {
            return Err(AthenaError::validation("Please select a voice"));
        }
        let url = format!("{}/creator/clone_builtin", self.base_url);
        let envelope: Envelope<serde_json::Value> = self
            .http
            .send_json(
                Method::POST,
                &url,
                &[],
                Some(&CloneVoiceRequest { user_id, voice_id }),
            )
            .await?;
        accepted(envelope)?;
        info!(user_id, voice_id, "Saved voice selection");
        Ok(())
    }
}

fn accepted<T>(envelope: Envelope<T>) -> AthenaResult<Envelope<T>> {
    if envelope.is_failure() {
        let message = envelope
            .server_message()
            .unwrap_or_else(|| "request was not accepted".to_string());
        return Err(AthenaError::ApiRejected(message));
    }
    Ok(envelope)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// One creator's agent list.
///
/// Every operation takes `&mut self`, so at most one request is outstanding
/// per catalog.
#[derive(Debug)]
pub struct AgentCatalog {
    client: AgentsClient,
    creator_id: String,
    agents: Vec<Agent>,
    state: LoadState,
}

impl AgentCatalog {
    pub fn new(client: AgentsClient, creator_id: impl Into<String>) -> Self {
        Self {
            client,
            creator_id: creator_id.into(),
            agents: Vec::new(),
            state: LoadState::Idle,
        }
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.matches_id(id))
    }

    /// Load (or reload after a failure) the list.
    pub async fn refresh(&mut self) -> AthenaResult<&[Agent]> {
        self.state = LoadState::Loading;
        match self.client.list(&self.creator_id).await {
            Ok(agents) => {
                self.agents = agents;
                self.state = LoadState::Loaded;
                Ok(&self.agents)
            }
            Err(e) => {
                debug!(creator_id = %self.creator_id, "Failed to load agents: {}", e);
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Delete after `confirm` approves. Returns `Ok(false)` when declined.
    ///
    /// On success the agent is dropped from the local list without a re-fetch.
    pub async fn delete<F>(&mut self, id: &str, confirm: F) -> AthenaResult<bool>
    where
        F: FnOnce(&Agent) -> bool,
    {
        let agent = self
            .get(id)
            .ok_or_else(|| AthenaError::AgentNotFound(id.to_string()))?;
        if !confirm(agent) {
            debug!(id, "Delete declined");
            return Ok(false);
        }

        let agent_id = agent.id.clone();
        self.client.delete(&agent_id, &self.creator_id).await?;
        self.agents.retain(|a| a.id != agent_id);
        Ok(true)
    }

    /// Submit the form, then reload the list.
    pub async fn save(&mut self, form: &AgentForm) -> AthenaResult<Option<Agent>> {
        let saved = form.submit(&self.client).await?;
        self.refresh().await?;
        Ok(saved)
    }
}
