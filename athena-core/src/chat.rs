//! Turn-based chat with a hosted agent.
//!
//! The transcript is optimistic: the user's message is appended before the
//! request leaves, and exactly one reply or one error entry follows it. Every
//! send captures the session epoch; [`ChatSession::reset`] and
//! [`ChatSession::close`] advance it, so a reply that arrives afterwards is
//! dropped instead of landing in a transcript it no longer belongs to.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AthenaError, AthenaResult};
use crate::http::{ApiClient, Envelope};
use crate::models::{parse_timestamp, ChatAgent, ChatMessage, HistoryEntry};

pub const STARTER_PROMPTS: [&str; 3] = [
    "Tell me about your capabilities",
    "Explain a concept to me",
    "I have a question",
];

pub const HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
struct AgentListing {
    #[serde(default)]
    agents: Vec<ChatAgent>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryPage {
    #[serde(default)]
    messages: Vec<HistoryEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TurnRequest<'a> {
    user_id: &'a str,
    agent_id: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct TurnResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the agent-chat service.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Arc<ApiClient>,
    base_url: String,
}

impl ChatClient {
    pub fn new(http: Arc<ApiClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn list_agents(&self) -> AthenaResult<Vec<ChatAgent>> {
        let url = format!("{}/agents", self.base_url);
        let envelope: Envelope<AgentListing> = self.http.get_json(&url, &[]).await?;
        if envelope.is_failure() {
            return Err(AthenaError::ApiRejected(
                envelope
                    .server_message()
                    .unwrap_or_else(|| "Failed to load agent details".to_string()),
            ));
        }
        Ok(envelope.data.unwrap_or_default().agents)
    }

    /// Resolve one agent from the listing. The service has no lookup endpoint.
    pub async fn find_agent(&self, agent_id: &str) -> AthenaResult<ChatAgent> {
        self.list_agents()
            .await?
            .into_iter()
            .find(|a| a.agent_id == agent_id)
            .ok_or_else(|| AthenaError::AgentNotFound(agent_id.to_string()))
    }

    pub async fn history(&self, user_id: &str, agent_id: &str) -> AthenaResult<Vec<ChatMessage>> {
        let url = format!("{}/v1/chai/getHistory", self.base_url);
        let limit = HISTORY_LIMIT.to_string();
        let envelope: Envelope<HistoryPage> = self
            .http
            .get_json(
                &url,
                &[
                    ("userId", user_id),
                    ("agentId", agent_id),
                    ("limit", limit.as_str()),
                    ("offset", "0"),
                ],
            )
            .await?;
        let messages = envelope.data.unwrap_or_default().messages;
        Ok(messages.into_iter().map(ChatMessage::from).collect())
    }

    /// One request/response turn. Returns the agent's reply.
    pub async fn send_turn(
        &self,
        user_id: &str,
        agent_id: &str,
        message: &str,
    ) -> AthenaResult<ChatMessage> {
        if message.trim().is_empty() {
            return Err(AthenaError::validation("Message cannot be empty"));
        }
        let url = format!("{}/chat", self.base_url);
        let response: TurnResponse = self
            .http
            .send_json(
                reqwest::Method::POST,
                &url,
                &[],
                Some(&TurnRequest {
                    user_id,
                    agent_id,
                    message,
                }),
            )
            .await?;

        if !response.success {
            return Err(AthenaError::ChatFailed(
                response
                    .error
                    .unwrap_or_else(|| "Failed to get response".to_string()),
            ));
        }
        let timestamp = response.timestamp.as_deref().and_then(parse_timestamp);
        Ok(ChatMessage::agent(
            response.response.unwrap_or_default(),
            timestamp,
        ))
    }

    /// Resolve the agent and fetch its history concurrently.
    ///
    /// A missing history is logged and the session starts empty; a missing
    /// agent fails the open.
    pub async fn open(&self, user_id: &str, agent_id: &str) -> AthenaResult<ChatSession> {
        let (agent, history) =
            tokio::join!(self.find_agent(agent_id), self.history(user_id, agent_id));
        let agent = agent?;
        let transcript = history.unwrap_or_else(|e| {
            warn!(agent_id, "Could not load chat history, starting fresh: {}", e);
            Vec::new()
        });

        info!(
            agent_id,
            agent = agent.display_name(),
            messages = transcript.len(),
            "Opened chat session"
        );
        Ok(ChatSession {
            client: self.clone(),
            user_id: user_id.to_string(),
            agent,
            inner: Mutex::new(Inner {
                state: ChatState::Ready,
                transcript,
            }),
            epoch: AtomicU64::new(0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    LoadingHistory,
    Ready,
    Sending,
    Closed,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// The agent's reply, already appended.
    Replied(ChatMessage),
    /// The turn failed; one error entry was appended.
    Failed { error: AthenaError },
    /// The session was reset or closed while the request was out.
    Discarded,
}

#[derive(Debug)]
struct Inner {
    state: ChatState,
    transcript: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct ChatSession {
    client: ChatClient,
    user_id: String,
    agent: ChatAgent,
    inner: Mutex<Inner>,
    epoch: AtomicU64,
}

impl ChatSession {
    pub fn agent(&self) -> &ChatAgent {
        &self.agent
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn state(&self) -> ChatState {
        self.inner.lock().await.state
    }

    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.inner.lock().await.transcript.clone()
    }

    pub async fn send(&self, text: &str) -> AthenaResult<SendOutcome> {
        if text.trim().is_empty() {
            return Err(AthenaError::validation("Message cannot be empty"));
        }

        let epoch = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                ChatState::Ready => {}
                ChatState::Sending => return Err(AthenaError::MessageInFlight),
                ChatState::Closed => return Err(AthenaError::ChatClosed),
                ChatState::LoadingHistory => {
                    return Err(AthenaError::validation("Chat history is still loading"))
                }
            }
            inner.transcript.push(ChatMessage::user(text));
            inner.state = ChatState::Sending;
            self.epoch.load(Ordering::SeqCst)
        };

        let result = self
            .client
            .send_turn(&self.user_id, &self.agent.agent_id, text)
            .await;

        let mut inner = self.inner.lock().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(agent_id = %self.agent.agent_id, "Dropping reply for a reset session");
            return Ok(SendOutcome::Discarded);
        }
        inner.state = ChatState::Ready;

        match result {
            Ok(reply) => {
                inner.transcript.push(reply.clone());
                Ok(SendOutcome::Replied(reply))
            }
            Err(error) => {
                warn!(agent_id = %self.agent.agent_id, "Chat turn failed: {}", error);
                inner.transcript.push(ChatMessage::error());
                Ok(SendOutcome::Failed { error })
            }
        }
    }

    /// Refetch history, replacing the transcript.
    pub async fn reload_history(&self) -> AthenaResult<usize> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                ChatState::Ready => {}
                ChatState::Closed => return Err(AthenaError::ChatClosed),
                ChatState::Sending | ChatState::LoadingHistory => {
                    return Err(AthenaError::MessageInFlight)
                }
            }
            inner.state = ChatState::LoadingHistory;
            self.epoch.load(Ordering::SeqCst)
        };

        let result = self
            .client
            .history(&self.user_id, &self.agent.agent_id)
            .await;

        let mut inner = self.inner.lock().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Ok(0);
        }
        inner.state = ChatState::Ready;
        let messages = result?;
        let count = messages.len();
        inner.transcript = messages;
        Ok(count)
    }

    /// Clear the transcript. A reply still in flight is dropped when it lands.
    pub async fn reset(&self) -> AthenaResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.state == ChatState::Closed {
            return Err(AthenaError::ChatClosed);
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        inner.transcript.clear();
        inner.state = ChatState::Ready;
        debug!(agent_id = %self.agent.agent_id, "Chat reset");
        Ok(())
    }

    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        inner.state = ChatState::Closed;
        debug!(agent_id = %self.agent.agent_id, "Chat closed");
    }
}
