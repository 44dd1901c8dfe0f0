//! # Shield Groups
//!
//! **Pick contacts from a live roster and create a group conversation.**
//!
//! The crate holds the state and rules behind the "new group" screen:
//!
//! - **Live roster sync**: one subscription per screen, full-replace snapshots,
//!   automatic resubscribe after interruptions
//! - **Selection model**: one ordered list of selected users; ids and count
//!   are derived from it
//! - **Group composition**: name validation, creator-first membership, single
//!   atomic write, navigation hand-off
//! - **Header badge**: selection count for the screen header
//!
//! Rendering, authentication and the backend itself are collaborators the
//! application plugs in through [`store::UserDirectory`], [`store::ChatStore`],
//! [`composer::Navigator`] and [`session::RowPresenter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use shield_groups::{
//!     CurrentUser, GroupComposer, GroupId, GroupScreenSession, GroupsConfig, MemoryStore,
//!     Navigator, RosterSync, UserDoc, UserId,
//! };
//!
//! struct OpenChat;
//!
//! impl Navigator for OpenChat {
//!     fn go_to_conversation(&mut self, id: &GroupId, display_name: &str) {
//!         println!("open {} ({})", display_name, id);
//!     }
//! }
//!
//! let store = MemoryStore::new();
//! store
//!     .put_user("u1", UserDoc { name: Some("Ana".into()), email: Some("ana@example.com".into()) })
//!     .unwrap();
//!
//! let config = GroupsConfig::default();
//! let sync = RosterSync::new(Arc::new(store.clone()), &config);
//! let me = CurrentUser::new("me@example.com", Some("Me"));
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! rt.block_on(async {
//!     let composer = GroupComposer::new(store.clone(), OpenChat);
//!     let mut session = GroupScreenSession::open(&sync, composer, me);
//!     session.next_roster().await;
//!
//!     session.press(&UserId::from("u1"));
//!     session.set_group_name("Team A");
//!     let id = session.create_group().await.unwrap();
//!     session.close();
//!
//!     assert_eq!(store.chat(&id).unwrap().unwrap().members().len(), 2);
//! });
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`roster`] | Live roster subscription and snapshots |
//! | [`selection`] | Selected users, in selection order |
//! | [`composer`] | Group validation, assembly and creation |
//! | [`badge`] | Selection count badge |
//! | [`session`] | One screen lifetime tying the above together |
//! | [`store`] | Backend contract and in-memory backend |
//! | [`group`], [`user`], [`ids`] | Data model |
//! | [`config`], [`error`] | Configuration and error taxonomy |

#![allow(
    clippy::empty_line_after_doc_comments,
    clippy::doc_lazy_continuation
)]

// ── Public modules ──────────────────────────────────────────────────────────

pub mod badge;
pub mod composer;
pub mod config;
pub mod error;
pub mod group;
pub mod ids;
pub mod roster;
pub mod selection;
pub mod session;
pub mod store;
pub mod user;

// ── Re-exports for convenience ──────────────────────────────────────────────

pub use badge::HeaderBadge;
pub use composer::{GroupComposer, Navigator};
pub use config::{GroupsConfig, Labels, RosterConfig};
pub use error::{ComposeError, Notice, SyncError, ValidationError};
pub use group::{ChatDocument, Group, GroupName, MemberRecord};
pub use ids::{GroupId, UserId};
pub use roster::{RosterEntry, RosterSnapshot, RosterSubscription, RosterSync};
pub use selection::{SelectionEntry, SelectionModel};
pub use session::{GroupScreenSession, RowPresenter, SelectableRow};
pub use store::{ChatStore, MemoryStore, OrderDirection, RosterQuery, StoreError, UserDirectory};
pub use user::{CurrentUser, DisplayIdentity, User, UserDoc};

// ── Library metadata ────────────────────────────────────────────────────────

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert!(version().contains('.'));
    }
}
