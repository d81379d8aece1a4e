mod agent;
mod chat;
pub(crate) mod de;
mod training;
mod user;

pub use agent::{Agent, AgentId, AgentKind, Formality, Personality, Tone, Visibility};
pub(crate) use chat::{parse_timestamp, HistoryEntry};
pub use chat::{ChatAgent, ChatMessage, CHAT_ERROR_TEXT};
pub use training::TrainingReceipt;
pub use user::{Role, User};
