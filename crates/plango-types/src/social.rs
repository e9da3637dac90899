use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemberRole {
    Organizer,
    #[default]
    Member,
    Viewer,
    Other(String),
}

impl MemberRole {
    pub fn as_str(&self) -> &str {
        match self {
            MemberRole::Organizer => "organizer",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
            MemberRole::Other(role) => role,
        }
    }
}

impl From<String> for MemberRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "organizer" => MemberRole::Organizer,
            "member" => MemberRole::Member,
            "viewer" => MemberRole::Viewer,
            _ => MemberRole::Other(role),
        }
    }
}

impl From<&str> for MemberRole {
    fn from(role: &str) -> Self {
        MemberRole::from(role.to_string())
    }
}

impl From<MemberRole> for String {
    fn from(role: MemberRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TripMember {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    #[serde(default)]
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JoinRequest {
    pub trip_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageCreate {
    pub trip_id: i64,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommentCreate {
    pub trip_id: i64,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_survive_round_trip() {
        let role: MemberRole = serde_json::from_str("\"co-pilot\"").unwrap();
        assert_eq!(role, MemberRole::Other("co-pilot".into()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"co-pilot\"");

        let organizer: MemberRole = serde_json::from_str("\"organizer\"").unwrap();
        assert_eq!(organizer, MemberRole::Organizer);
    }

    #[test]
    fn new_members_default_to_member_role() {
        assert_eq!(MemberRole::default(), MemberRole::Member);
        assert_eq!(MemberRole::default().to_string(), "member");
    }
}
