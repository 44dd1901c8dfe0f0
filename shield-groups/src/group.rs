/// Group records written to the `chats` collection.
///
/// A group is created once with a fixed shape:
/// - `users`: member snapshots, creator first, then the selected users in
///   selection order
/// - `groupAdmins`: exactly the creator's email
/// - `messages`: empty
/// - `lastUpdated`: creation time in epoch milliseconds
///
/// Member records are copies of identity at creation time, not references
/// into the roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::GroupId;
use crate::user::{CurrentUser, User};

// ---------------------------------------------------------------------------
// GroupName
// ---------------------------------------------------------------------------

/// A trimmed, non-empty group name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupName(String);

impl GroupName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(GroupName(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// ---------------------------------------------------------------------------
// MemberRecord
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub email: Option<String>,
    pub name: Option<String>,
    pub deleted_from_chat: bool,
}

impl MemberRecord {
    pub fn from_current(current: &CurrentUser) -> Self {
        MemberRecord {
            email: Some(current.email.clone()),
            name: current.display_name.clone(),
            deleted_from_chat: false,
        }
    }

    pub fn from_user(user: &User) -> Self {
        MemberRecord {
            email: user.email.clone(),
            name: user.name.clone(),
            deleted_from_chat: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatDocument
// ---------------------------------------------------------------------------

/// Body of a `chats` document, exactly as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatDocument {
    #[serde(rename = "lastUpdated", with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "users")]
    pub members: Vec<MemberRecord>,
    /// Message exchange happens elsewhere; the list is opaque here.
    pub messages: Vec<serde_json::Value>,
    #[serde(rename = "groupName")]
    pub group_name: String,
    #[serde(rename = "groupAdmins")]
    pub admins: Vec<String>,
}

impl ChatDocument {
    /// Assemble a new group: creator first and sole admin, then `selected`
    /// in order. Millisecond precision matches the stored representation.
    pub fn new_group(
        name: GroupName,
        creator: &CurrentUser,
        selected: &[User],
        now: DateTime<Utc>,
    ) -> Self {
        let mut members = Vec::with_capacity(selected.len() + 1);
        members.push(MemberRecord::from_current(creator));
        members.extend(selected.iter().map(MemberRecord::from_user));

        let last_updated =
            DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        ChatDocument {
            last_updated,
            members,
            messages: Vec::new(),
            group_name: name.into_string(),
            admins: vec![creator.email.clone()],
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A stored group: the store-generated id plus the document body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(flatten)]
    pub document: ChatDocument,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.document.group_name
    }

    pub fn members(&self) -> &[MemberRecord] {
        &self.document.members
    }

    pub fn admins(&self) -> &[String] {
        &self.document.admins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> CurrentUser {
        CurrentUser::new("admin@example.com", Some("Admin"))
    }

    #[test]
    fn test_group_name_trimmed() {
        assert_eq!(GroupName::parse("  Team A \n").unwrap().as_str(), "Team A");
    }

    #[test]
    fn test_group_name_blank_rejected() {
        assert!(matches!(GroupName::parse(""), Err(ValidationError::EmptyName)));
        assert!(matches!(GroupName::parse(" \t "), Err(ValidationError::EmptyName)));
    }

    #[test]
    fn test_new_group_shape() {
        let u1 = User::new("u1", Some("Uno"), Some("uno@example.com"));
        let u2 = User::new("u2", None, Some("dos@example.com"));
        let doc = ChatDocument::new_group(
            GroupName::parse("Team A").unwrap(),
            &admin(),
            &[u1, u2],
            Utc::now(),
        );

        assert_eq!(doc.members.len(), 3);
        assert_eq!(doc.members[0].email.as_deref(), Some("admin@example.com"));
        assert_eq!(doc.members[0].name.as_deref(), Some("Admin"));
        assert_eq!(doc.members[1].name.as_deref(), Some("Uno"));
        assert_eq!(doc.members[2].email.as_deref(), Some("dos@example.com"));
        assert_eq!(doc.members[2].name, None);
        assert!(doc.members.iter().all(|m| !m.deleted_from_chat));
        assert_eq!(doc.admins, vec!["admin@example.com".to_string()]);
        assert!(doc.messages.is_empty());
        assert_eq!(doc.group_name, "Team A");
    }

    #[test]
    fn test_creator_only_group() {
        let doc = ChatDocument::new_group(GroupName::parse("Solo").unwrap(), &admin(), &[], Utc::now());
        assert_eq!(doc.members.len(), 1);
    }

    #[test]
    fn test_wire_shape() {
        let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        let doc = ChatDocument::new_group(
            GroupName::parse("Team A").unwrap(),
            &admin(),
            &[User::new("u1", Some("Uno"), None)],
            now,
        );
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["lastUpdated"], 1_700_000_000_123i64);
        assert_eq!(value["groupName"], "Team A");
        assert_eq!(value["groupAdmins"][0], "admin@example.com");
        assert_eq!(value["messages"].as_array().unwrap().len(), 0);
        assert_eq!(value["users"][0]["deletedFromChat"], false);
        assert_eq!(value["users"][1]["name"], "Uno");
        assert!(value["users"][1]["email"].is_null());

        let back = ChatDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
