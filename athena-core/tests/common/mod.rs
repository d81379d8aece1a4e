#![allow(dead_code)]

use athena_core::{
    AthenaClient, EndpointsConfig, HttpConfig, MemorySessionStore, Role, SessionContext, User,
};
use std::sync::Arc;
use wiremock::MockServer;

/// Every service pointed at one mock server.
pub fn client_for(server: &MockServer) -> AthenaClient {
    let endpoints = EndpointsConfig {
        api_base_url: server.uri(),
        creator_base_url: server.uri(),
        train_url: format!("{}/train", server.uri()),
        chat_base_url: server.uri(),
    };
    AthenaClient::from_endpoints(endpoints.resolve().unwrap(), &HttpConfig::default()).unwrap()
}

pub async fn empty_session() -> SessionContext {
    SessionContext::load(Arc::new(MemorySessionStore::new()))
        .await
        .unwrap()
}

pub async fn session_as(user_id: &str, role: Role) -> SessionContext {
    SessionContext::load(Arc::new(MemorySessionStore::with_user(User::new(
        user_id, role,
    ))))
    .await
    .unwrap()
}
