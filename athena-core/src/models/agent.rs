use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use super::de::{
    lenient_enum, lenient_timestamp, null_as_default, opt_string_or_number, string_or_number,
};
use crate::error::AthenaError;

/// Server-assigned agent id. Some services send integers, others UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(AgentId)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        AgentId(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        AgentId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Instructor,
    ItSupport,
    Administration,
}

impl AgentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Instructor => "Instructor",
            AgentKind::ItSupport => "IT Support",
            AgentKind::Administration => "Administration",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Instructor => write!(f, "instructor"),
            AgentKind::ItSupport => write!(f, "it_support"),
            AgentKind::Administration => write!(f, "administration"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "instructor" => Ok(AgentKind::Instructor),
            "it_support" => Ok(AgentKind::ItSupport),
            "administration" => Ok(AgentKind::Administration),
            other => Err(AthenaError::validation(format!(
                "unknown agent type '{}' (expected instructor, it_support or administration)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Enthusiastic,
    Supportive,
    Strict,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Friendly => write!(f, "friendly"),
            Tone::Professional => write!(f, "professional"),
            Tone::Enthusiastic => write!(f, "enthusiastic"),
            Tone::Supportive => write!(f, "supportive"),
            Tone::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for Tone {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Ok(Tone::Friendly),
            "professional" => Ok(Tone::Professional),
            "enthusiastic" => Ok(Tone::Enthusiastic),
            "supportive" => Ok(Tone::Supportive),
            "strict" => Ok(Tone::Strict),
            other => Err(AthenaError::validation(format!("unknown tone '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Casual,
    #[default]
    Professional,
    Formal,
}

impl std::fmt::Display for Formality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formality::Casual => write!(f, "casual"),
            Formality::Professional => write!(f, "professional"),
            Formality::Formal => write!(f, "formal"),
        }
    }
}

impl FromStr for Formality {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(Formality::Casual),
            "professional" => Ok(Formality::Professional),
            "formal" => Ok(Formality::Formal),
            other => Err(AthenaError::validation(format!(
                "unknown formality '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Personality {
    #[serde(default, deserialize_with = "lenient_enum")]
    pub tone: Tone,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub formality: Formality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Campus,
    Public,
}

impl Visibility {
    pub fn label(&self) -> &'static str {
        match self {
            Visibility::Private => "Private",
            Visibility::Campus => "Campus",
            Visibility::Public => "Public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Campus => write!(f, "campus"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

impl FromStr for Visibility {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "campus" => Ok(Visibility::Campus),
            "public" => Ok(Visibility::Public),
            other => Err(AthenaError::validation(format!(
                "unknown visibility '{}'",
                other
            ))),
        }
    }
}

/// An agent as stored by the creator service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub agent_type: AgentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub campus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub courses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personality: Personality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub visibility: Visibility,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub creator_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Agent {
    pub fn new(
        id: impl Into<AgentId>,
        domain: impl Into<String>,
        campus: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_id: None,
            agent_type: AgentKind::default(),
            name: None,
            description: None,
            domain: domain.into(),
            campus: campus.into(),
            region: None,
            courses: Vec::new(),
            personality: Personality::default(),
            model_type: None,
            temperature: None,
            visibility: Visibility::default(),
            creator_id: None,
            created_at: None,
        }
    }

    /// `name`, then `domain`, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(Some(self.domain.as_str()).filter(|d| !d.trim().is_empty()))
            .unwrap_or("Unnamed Agent")
    }

    /// The id the training service expects: `agent_id` when the record has one.
    pub fn training_id(&self) -> &AgentId {
        self.agent_id.as_ref().unwrap_or(&self.id)
    }

    /// Whether `id` names this agent under either of its ids.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.as_str() == id || self.agent_id.as_ref().is_some_and(|a| a.as_str() == id)
    }

    /// First three courses plus the count of the rest.
    pub fn course_preview(&self) -> (Vec<&str>, usize) {
        let shown: Vec<&str> = self.courses.iter().take(3).map(String::as_str).collect();
        let hidden = self.courses.len().saturating_sub(3);
        (shown, hidden)
    }
}
