//! Backend store contract.
//!
//! The backend exposes two collections:
//!
//! 1. **`users`**: read through a live, ordered query. The feed holds only
//!    the latest complete ordered snapshot; each change replaces it, never
//!    a diff.
//! 2. **`chats`**: written once per group with a single atomic create. The
//!    store generates the document id.
//!
//! The application supplies the real backend; `memory::MemoryStore` is an
//! in-process implementation with the same semantics.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tokio::sync::watch;

use crate::group::ChatDocument;
use crate::ids::GroupId;
use crate::user::User;

pub mod memory;

pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Store connection closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Ordered query over the `users` collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterQuery {
    pub order_key: String,
    pub direction: OrderDirection,
}

impl Default for RosterQuery {
    fn default() -> Self {
        RosterQuery {
            order_key: "name".to_string(),
            direction: OrderDirection::Ascending,
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts (backend implements)
// ---------------------------------------------------------------------------

/// Live roster feed. The current value is the newest snapshot; changes
/// overwrite it, so a slow reader skips straight to the latest roster.
/// An `Err` value means the feed is broken and will not recover by itself;
/// a dropped sender means the same.
pub type UserFeed = watch::Receiver<Result<Vec<User>, StoreError>>;

/// Read side: the `users` collection.
pub trait UserDirectory: Send + Sync {
    /// Open a live query. The feed starts out holding the current contents
    /// and is overwritten with a full snapshot on every change. Dropping the
    /// returned feed releases the query on the store side.
    fn watch_users(&self, query: &RosterQuery) -> Result<UserFeed, StoreError>;
}

/// Write side: the `chats` collection.
pub trait ChatStore {
    /// Create one new document with a freshly generated id. Resolves once
    /// the store acknowledges the write. No read-modify-write.
    fn create_chat(
        &self,
        document: ChatDocument,
    ) -> impl Future<Output = Result<GroupId, StoreError>> + Send;
}
