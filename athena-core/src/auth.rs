use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AthenaError, AthenaResult};
use crate::http::{ApiClient, Envelope};
use crate::models::{Role, User};
use crate::routing::Route;
use crate::session::SessionContext;

#[derive(Serialize)]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

/// Client for the auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Arc<ApiClient>,
    base_url: String,
}

impl AuthClient {
    pub fn new(http: Arc<ApiClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Check credentials and return the user record. Does not touch the session.
    pub async fn authenticate(&self, user_id: &str, password: &str) -> AthenaResult<User> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AthenaError::validation("User ID is required"));
        }
        if password.trim().is_empty() {
            return Err(AthenaError::validation("Password is required"));
        }

        let url = format!("{}/auth/login", self.base_url);
        let envelope: Envelope<Value> = self
            .http
            .send_json(
                Method::POST,
                &url,
                &[],
                Some(&LoginRequest { user_id, password }),
            )
            .await
            .map_err(|e| match e {
                AthenaError::ApiStatus { message, .. } => {
                    AthenaError::AuthenticationFailed(message)
                }
                other => other,
            })?;

        if envelope.is_failure() {
            let message = envelope
                .server_message()
                .unwrap_or_else(|| "Invalid credentials".to_string());
            warn!(user_id, "Login rejected: {}", message);
            return Err(AthenaError::AuthenticationFailed(message));
        }

        let data = envelope
            .data
            .ok_or_else(|| AthenaError::ApiParseError("login response has no user record".into()))?;

        // Role first so an unknown role surfaces as such rather than a decode error.
        let role = data
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| AthenaError::ApiParseError("login response has no role".into()))?;
        role.parse::<Role>()?;

        serde_json::from_value(data).map_err(|e| AthenaError::ApiParseError(e.to_string()))
    }

    /// Authenticate, persist the user and return the landing route for their role.
    pub async fn login(
        &self,
        session: &mut SessionContext,
        user_id: &str,
        password: &str,
    ) -> AthenaResult<Route> {
        let user = self.authenticate(user_id, password).await?;
        let route = Route::landing(user.role);
        info!(user_id = %user.user_id, role = %user.role, route = route.path(), "Signed in");
        session.set_user(user).await?;
        Ok(route)
    }

    /// Drop the user record and paid-agent set.
    pub async fn logout(&self, session: &mut SessionContext) -> AthenaResult<()> {
        if let Some(user) = session.user() {
            info!(user_id = %user.user_id, "Signing out");
        }
        session.clear().await
    }
}
