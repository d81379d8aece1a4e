//! Persisted sign-in state.
//!
//! A [`SessionStore`] reads and writes the [`SessionRecord`]; a
//! [`SessionContext`] wraps a store and is handed to every command that needs
//! to know who is signed in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{AthenaError, AthenaResult};
use crate::models::User;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub user: Option<User>,
    /// Agents the user has unlocked. Display hint only, never checked by a server.
    #[serde(default)]
    pub paid_agents: BTreeSet<String>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> AthenaResult<SessionRecord>;

    async fn save(&self, record: &SessionRecord) -> AthenaResult<()>;

    async fn clear(&self) -> AthenaResult<()>;
}

/// JSON file store. Writes go to a sibling temp file and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AthenaResult<SessionRecord> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(SessionRecord::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AthenaError::SessionStorage(format!(
                    "Corrupt session file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionRecord::default()),
            Err(e) => Err(AthenaError::SessionStorage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, record: &SessionRecord) -> AthenaResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AthenaError::SessionStorage(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(record)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, contents).await.map_err(|e| {
            AthenaError::SessionStorage(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            AthenaError::SessionStorage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> AthenaResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AthenaError::SessionStorage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: RwLock<SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self {
            record: RwLock::new(SessionRecord {
                user: Some(user),
                paid_agents: BTreeSet::new(),
            }),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> AthenaResult<SessionRecord> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &SessionRecord) -> AthenaResult<()> {
        *self.record.write().await = record.clone();
        Ok(())
    }

    async fn clear(&self) -> AthenaResult<()> {
        *self.record.write().await = SessionRecord::default();
        Ok(())
    }
}

/// The signed-in state for one process, backed by a store.
///
/// Created with [`SessionContext::load`] at startup and emptied with
/// [`SessionContext::clear`] at logout.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    record: SessionRecord,
}

impl SessionContext {
    pub async fn load(store: Arc<dyn SessionStore>) -> AthenaResult<Self> {
        let record = store.load().await?;
        if let Some(user) = &record.user {
            debug!(user_id = %user.user_id, role = %user.role, "Restored session");
        }
        Ok(Self { store, record })
    }

    pub async fn clear(&mut self) -> AthenaResult<()> {
        self.store.clear().await?;
        self.record = SessionRecord::default();
        info!("Session cleared");
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.record.user.as_ref()
    }

    pub fn require_user(&self) -> AthenaResult<&User> {
        self.user().ok_or(AthenaError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.record.user.is_some()
    }

    /// Replace the signed-in user and persist.
    pub async fn set_user(&mut self, user: User) -> AthenaResult<()> {
        let mut next = self.record.clone();
        next.user = Some(user);
        self.store.save(&next).await?;
        self.record = next;
        Ok(())
    }

    /// Returns `false` when the agent was already marked.
    pub async fn mark_paid(&mut self, agent_id: &str) -> AthenaResult<bool> {
        if self.record.paid_agents.contains(agent_id) {
            return Ok(false);
        }
        let mut next = self.record.clone();
        next.paid_agents.insert(agent_id.to_string());
        self.store.save(&next).await?;
        self.record = next;
        Ok(true)
    }

    pub fn is_paid(&self, agent_id: &str) -> bool {
        self.record.paid_agents.contains(agent_id)
    }

    pub fn paid_agents(&self) -> impl Iterator<Item = &str> {
        self.record.paid_agents.iter().map(String::as_str)
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }
}
