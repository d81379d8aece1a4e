use anyhow::{Context, Result};
use athena_core::{
    AthenaClient, AthenaConfig, FileSessionStore, SessionContext, SessionStore, User,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::output::OutputFormat;

/// Everything a command needs: resolved config, service clients and the
/// persisted session.
pub struct CliContext {
    pub config: AthenaConfig,
    pub client: AthenaClient,
    pub session: SessionContext,
    pub session_path: PathBuf,
    pub format: OutputFormat,
}

impl CliContext {
    pub async fn load(config: AthenaConfig, format: OutputFormat) -> Result<Self> {
        let client = AthenaClient::new(&config)?;
        let session_path = config.session_path()?;
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&session_path));
        let session = SessionContext::load(store)
            .await
            .with_context(|| format!("Failed to read session from {}", session_path.display()))?;

        Ok(Self {
            config,
            client,
            session,
            session_path,
            format,
        })
    }

    pub fn user(&self) -> Result<User> {
        Ok(self.session.require_user()?.clone())
    }
}
