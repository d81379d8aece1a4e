use serde::Serialize;

use crate::error::{AthenaError, AthenaResult};
use crate::models::{AgentId, Role};
use crate::session::SessionContext;

/// Every view a signed-in user can land on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Login,
    Student,
    Creator,
    Configuration,
    Train { agent_id: Option<AgentId> },
    Chat { agent_id: AgentId },
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Student => "/student",
            Route::Creator => "/creator",
            Route::Configuration => "/configuration",
            Route::Train { .. } => "/train",
            Route::Chat { .. } => "/chat",
        }
    }

    /// Where a freshly signed-in user goes.
    pub fn landing(role: Role) -> Route {
        match role {
            Role::Student => Route::Student,
            Role::Instructor => Route::Creator,
            Role::Admin => Route::Configuration,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        match self {
            Route::Login | Route::Student | Route::Chat { .. } => true,
            Route::Creator | Route::Train { .. } => role == Role::Instructor,
            Route::Configuration => role == Role::Admin,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Train {
                agent_id: Some(id),
            } => write!(f, "{}?agentId={}", self.path(), id),
            Route::Chat { agent_id } => write!(f, "{}/{}", self.path(), agent_id),
            _ => f.write_str(self.path()),
        }
    }
}

/// Resolve the route a session may actually open.
///
/// No user sends the caller to [`Route::Login`]; a signed-in user whose role
/// may not open `route` gets [`AthenaError::RouteForbidden`].
pub fn guard(session: &SessionContext, route: Route) -> AthenaResult<Route> {
    let Some(user) = session.user() else {
        return Ok(Route::Login);
    };
    if route.permits(user.role) {
        Ok(route)
    } else {
        Err(AthenaError::RouteForbidden {
            role: user.role.to_string(),
            route: route.path().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    async fn session_for(role: Option<Role>) -> SessionContext {
        let store = match role {
            Some(role) => MemorySessionStore::with_user(User::new("U1", role)),
            None => MemorySessionStore::new(),
        };
        SessionContext::load(Arc::new(store)).await.unwrap()
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(Route::landing(Role::Student).path(), "/student");
        assert_eq!(Route::landing(Role::Instructor).path(), "/creator");
        assert_eq!(Route::landing(Role::Admin).path(), "/configuration");
    }

    #[test]
    fn test_display_includes_agent() {
        let route = Route::Chat {
            agent_id: AgentId::new("a-9"),
        };
        assert_eq!(route.to_string(), "/chat/a-9");
        assert_eq!(Route::Train { agent_id: None }.to_string(), "/train");
    }

    #[tokio::test]
    async fn test_guard_without_session_redirects_to_login() {
        let session = session_for(None).await;
        assert_eq!(guard(&session, Route::Creator).unwrap(), Route::Login);
    }

    #[tokio::test]
    async fn test_guard_checks_role() {
        let student = session_for(Some(Role::Student)).await;
        assert!(matches!(
            guard(&student, Route::Train { agent_id: None }),
            Err(AthenaError::RouteForbidden { .. })
        ));
        let chat = Route::Chat {
            agent_id: AgentId::new("1"),
        };
        assert_eq!(guard(&student, chat.clone()).unwrap(), chat);

        let instructor = session_for(Some(Role::Instructor)).await;
        assert_eq!(guard(&instructor, Route::Creator).unwrap(), Route::Creator);
        assert!(guard(&instructor, Route::Configuration).is_err());

        let admin = session_for(Some(Role::Admin)).await;
        assert_eq!(
            guard(&admin, Route::Configuration).unwrap(),
            Route::Configuration
        );
    }
}
