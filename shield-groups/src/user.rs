/// Roster users and the acting (authenticated) user.
///
/// `User` is a read-only view of a document in the `users` collection.
/// `DisplayIdentity` resolves the row title once per snapshot with a fixed
/// precedence: name, else email, else the configured placeholder label.

use serde::{Deserialize, Serialize};

use crate::config::Labels;
use crate::ids::UserId;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Fields of a `users` document. Both are optional in the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A roster candidate. Identity is `id` only.
#[derive(Clone, Debug, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl User {
    pub fn new(id: impl Into<UserId>, name: Option<&str>, email: Option<&str>) -> Self {
        User {
            id: id.into(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    pub fn from_doc(id: UserId, doc: UserDoc) -> Self {
        User {
            id,
            email: doc.email,
            name: doc.name,
        }
    }

    /// Whether this user is the acting user. A user without an email never is.
    pub fn is_current(&self, current: &CurrentUser) -> bool {
        self.email.as_deref() == Some(current.email.as_str())
    }
}

// ---------------------------------------------------------------------------
// CurrentUser
// ---------------------------------------------------------------------------

/// The authenticated identity, passed explicitly to the roster filter and
/// to group composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
    pub display_name: Option<String>,
}

impl CurrentUser {
    pub fn new(email: impl Into<String>, display_name: Option<&str>) -> Self {
        CurrentUser {
            email: email.into(),
            display_name: display_name.map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayIdentity
// ---------------------------------------------------------------------------

/// Where a row title came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    Name,
    Email,
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub title: String,
    pub source: IdentitySource,
}

impl DisplayIdentity {
    pub fn for_user(user: &User, labels: &Labels) -> Self {
        if let Some(name) = non_blank(user.name.as_deref()) {
            return DisplayIdentity {
                title: name.to_string(),
                source: IdentitySource::Name,
            };
        }
        if let Some(email) = non_blank(user.email.as_deref()) {
            return DisplayIdentity {
                title: email.to_string(),
                source: IdentitySource::Email,
            };
        }
        DisplayIdentity {
            title: labels.no_identity.clone(),
            source: IdentitySource::Placeholder,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
