use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::de::{opt_string_or_number, string_or_number};
use crate::error::AthenaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl TryFrom<String> for Role {
    type Error = AthenaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Instructor => write!(f, "instructor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" | "creator" => Ok(Role::Instructor),
            "admin" | "administrator" => Ok(Role::Admin),
            other => Err(AthenaError::UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated user as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: Role,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub campus: Option<String>,
    /// Any other fields the auth service returned, kept so the persisted record
    /// round-trips unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            username: None,
            role,
            campus: None,
            extra: Map::new(),
        }
    }

    /// `name`, then `username`, then the user id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.username.as_deref().filter(|n| !n.trim().is_empty()))
            .unwrap_or(&self.user_id)
    }

    /// Owner id sent with agent create/list/delete requests.
    pub fn creator_id(&self) -> &str {
        &self.user_id
    }

    /// First letter of the username, upper-cased, for transcript prefixes.
    pub fn initial(&self) -> char {
        self.username
            .as_deref()
            .and_then(|u| u.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Instructor.to_string(), "instructor");
        assert_eq!(Role::Admin.to_string(), "admin");

        assert_eq!("Instructor".parse::<Role>().unwrap(), Role::Instructor);
        assert_eq!("creator".parse::<Role>().unwrap(), Role::Instructor);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(AthenaError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_user_from_login_payload() {
        let user: User = serde_json::from_value(serde_json::json!({
            "user_id": "T001",
            "name": "Dr. Haddad",
            "role": "instructor",
            "campus": "Beirut",
            "email": "haddad@example.edu"
        }))
        .unwrap();

        assert_eq!(user.user_id, "T001");
        assert_eq!(user.role, Role::Instructor);
        assert_eq!(user.display_name(), "Dr. Haddad");
        assert_eq!(user.extra["email"], "haddad@example.edu");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["email"], "haddad@example.edu");
    }

    #[test]
    fn test_role_decodes_case_insensitively() {
        let user: User =
            serde_json::from_value(serde_json::json!({"user_id": "T1", "role": "Instructor"}))
                .unwrap();
        assert_eq!(user.role, Role::Instructor);

        let user: User =
            serde_json::from_value(serde_json::json!({"user_id": "T2", "role": "CREATOR"}))
                .unwrap();
        assert_eq!(user.role, Role::Instructor);
        assert_eq!(serde_json::to_value(user.role).unwrap(), "instructor");

        let unknown = serde_json::json!({"user_id": "X", "role": "janitor"});
        assert!(serde_json::from_value::<User>(unknown).is_err());
    }

    #[test]
    fn test_numeric_user_id() {
        let user: User =
            serde_json::from_value(serde_json::json!({"user_id": 17, "role": "student"})).unwrap();
        assert_eq!(user.user_id, "17");
        assert_eq!(user.display_name(), "17");
        assert_eq!(user.initial(), 'U');
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = User::new("S100", Role::Student);
        user.username = Some("rana".to_string());
        assert_eq!(user.display_name(), "rana");
        assert_eq!(user.initial(), 'R');
    }
}
