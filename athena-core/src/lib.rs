//! Client library for the Athena educational agent platform.
//!
//! Every operation is a REST call to one of four services (auth, agent
//! management, training upload, agent chat). This crate owns the state around
//! those calls: the persisted session, role routing, the agent list view, the
//! agent form and the optimistic chat transcript.

pub mod agents;
pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod models;
pub mod routing;
pub mod session;
pub mod training;

pub use agents::{
    AgentCatalog, AgentDraft, AgentForm, AgentPayload, AgentsClient, FormMode, LoadState,
};
pub use auth::AuthClient;
pub use chat::{ChatClient, ChatSession, ChatState, SendOutcome, STARTER_PROMPTS};
pub use client::AthenaClient;
pub use config::{
    get_config_dir, get_data_dir, AthenaConfig, EndpointsConfig, HttpConfig, LoggingConfig,
    ResolvedEndpoints, SessionConfig,
};
pub use connection::ConnectionReport;
pub use error::{AthenaError, AthenaResult, CliErrorDisplay};
pub use http::{ApiClient, Envelope, RawResponse};
pub use models::{
    Agent, AgentId, AgentKind, ChatAgent, ChatMessage, Formality, Personality, Role, Tone,
    TrainingReceipt, User, Visibility,
};
pub use routing::{guard, Route};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionContext, SessionRecord, SessionStore,
};
pub use training::{format_file_size, TrainingDocument, TrainingUploader, MAX_UPLOAD_BYTES};
