use serde::Serialize;

use crate::error::{AthenaError, AthenaResult};
use crate::models::{Agent, AgentId, AgentKind, Personality, Visibility};

use super::AgentsClient;

pub const DEFAULT_REGION: &str = "Lebanon";
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Editable copy of an agent's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDraft {
    pub agent_type: AgentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub domain: String,
    pub campus: String,
    pub region: String,
    courses: Vec<String>,
    pub personality: Personality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub visibility: Visibility,
}

impl Default for AgentDraft {
    fn default() -> Self {
        Self {
            agent_type: AgentKind::default(),
            name: None,
            description: None,
            domain: String::new(),
            campus: String::new(),
            region: DEFAULT_REGION.to_string(),
            courses: Vec::new(),
            personality: Personality::default(),
            model_type: None,
            temperature: None,
            visibility: Visibility::default(),
        }
    }
}

impl AgentDraft {
    pub fn from_agent(agent: &Agent) -> Self {
        let mut draft = Self {
            agent_type: agent.agent_type,
            name: agent.name.clone(),
            description: agent.description.clone(),
            domain: agent.domain.clone(),
            campus: agent.campus.clone(),
            region: agent
                .region
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            courses: Vec::new(),
            personality: agent.personality,
            model_type: agent.model_type.clone(),
            temperature: agent.temperature,
            visibility: agent.visibility,
        };
        for course in &agent.courses {
            draft.add_course(course);
        }
        draft
    }

    pub fn courses(&self) -> &[String] {
        &self.courses
    }

    /// Returns `false` for blank or already-listed courses.
    pub fn add_course(&mut self, course: &str) -> bool {
        let course = course.trim();
        if course.is_empty() || self.courses.iter().any(|c| c == course) {
            return false;
        }
        self.courses.push(course.to_string());
        true
    }

    pub fn remove_course(&mut self, course: &str) -> bool {
        let before = self.courses.len();
        self.courses.retain(|c| c != course);
        self.courses.len() != before
    }

    pub fn validate(&self) -> AthenaResult<()> {
        if self.domain.trim().is_empty() {
            return Err(AthenaError::validation("Domain is required"));
        }
        if self.campus.trim().is_empty() {
            return Err(AthenaError::validation("Campus is required"));
        }
        if let Some(t) = self.temperature {
            if !TEMPERATURE_RANGE.contains(&t) {
                return Err(AthenaError::validation(format!(
                    "Temperature must be between {} and {} (got {})",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end(),
                    t
                )));
            }
        }
        Ok(())
    }
}

/// Body of a create or update request: the draft plus its owner.
#[derive(Debug, Clone, Serialize)]
pub struct AgentPayload<'a> {
    pub creator_id: &'a str,
    #[serde(flatten)]
    pub draft: &'a AgentDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(AgentId),
}

#[derive(Debug, Clone)]
pub struct AgentForm {
    mode: FormMode,
    owner_id: String,
    pub draft: AgentDraft,
}

impl AgentForm {
    pub fn create(owner_id: impl Into<String>) -> Self {
        Self {
            mode: FormMode::Create,
            owner_id: owner_id.into(),
            draft: AgentDraft::default(),
        }
    }

    pub fn edit(owner_id: impl Into<String>, agent: &Agent) -> Self {
        Self {
            mode: FormMode::Edit(agent.id.clone()),
            owner_id: owner_id.into(),
            draft: AgentDraft::from_agent(agent),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn payload(&self) -> AgentPayload<'_> {
        AgentPayload {
            creator_id: &self.owner_id,
            draft: &self.draft,
        }
    }

    /// Validate, then create or update. Nothing is sent when validation fails.
    pub async fn submit(&self, client: &AgentsClient) -> AthenaResult<Option<Agent>> {
        self.draft.validate()?;
        let payload = self.payload();
        match &self.mode {
            FormMode::Create => client.create(&payload).await,
            FormMode::Edit(id) => client.update(id, &payload).await,
        }
    }

    pub fn success_message(&self) -> &'static str {
        if self.is_editing() {
            "Agent updated successfully!"
        } else {
            "Agent created successfully!"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Formality, Tone};

    #[test]
    fn test_draft_defaults() {
        let draft = AgentDraft::default();
        assert_eq!(draft.agent_type, AgentKind::Instructor);
        assert_eq!(draft.region, "Lebanon");
        assert_eq!(draft.personality.tone, Tone::Friendly);
        assert_eq!(draft.personality.formality, Formality::Professional);
        assert_eq!(draft.visibility, Visibility::Private);
        assert!(draft.courses().is_empty());
    }

    #[test]
    fn test_add_course_trims_and_dedupes() {
        let mut draft = AgentDraft::default();
        assert!(draft.add_course("  CS101 "));
        assert!(!draft.add_course("CS101"));
        assert!(!draft.add_course("   "));
        assert!(draft.add_course("CS102"));
        assert_eq!(draft.courses(), ["CS101", "CS102"]);

        assert!(draft.remove_course("CS101"));
        assert!(!draft.remove_course("CS999"));
        assert_eq!(draft.courses(), ["CS102"]);
    }

    #[test]
    fn test_validate_requires_domain_and_campus() {
        let mut draft = AgentDraft::default();
        let err = draft.validate().unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("Domain"));

        draft.domain = "Mathematics".into();
        assert!(draft.validate().unwrap_err().to_string().contains("Campus"));

        draft.campus = "North".into();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validate_temperature_bounds() {
        let mut draft = AgentDraft::default();
        draft.domain = "CS".into();
        draft.campus = "Main".into();

        draft.temperature = Some(2.0);
        assert!(draft.validate().is_ok());
        draft.temperature = Some(2.5);
        assert!(draft.validate().is_err());
        draft.temperature = Some(-0.1);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_edit_copies_agent_fields() {
        let mut agent = Agent::new("9", "Physics", "South");
        agent.region = None;
        agent.courses = vec!["PHY101".into(), "PHY101".into()];
        agent.visibility = Visibility::Public;

        let form = AgentForm::edit("T001", &agent);
        assert_eq!(form.mode(), &FormMode::Edit(AgentId::new("9")));
        assert_eq!(form.draft.domain, "Physics");
        assert_eq!(form.draft.region, "Lebanon");
        assert_eq!(form.draft.courses(), ["PHY101"]);
        assert_eq!(form.success_message(), "Agent updated successfully!");
    }

    #[test]
    fn test_payload_merges_owner() {
        let mut form = AgentForm::create("T001");
        form.draft.domain = "CS".into();
        form.draft.campus = "Main".into();
        form.draft.add_course("CS101");

        let value = serde_json::to_value(form.payload()).unwrap();
        assert_eq!(value["creator_id"], "T001");
        assert_eq!(value["domain"], "CS");
        assert_eq!(value["region"], "Lebanon");
        assert_eq!(value["courses"], serde_json::json!(["CS101"]));
        assert_eq!(value["personality"]["tone"], "friendly");
        assert_eq!(value["visibility"], "private");
        assert!(value.get("temperature").is_none());
    }
}
