//! Error taxonomy for roster sync and group composition.
//!
//! - `ValidationError`: local, recoverable, no state change
//! - `SyncError`: the live roster feed was interrupted (resubscribed) or gave up
//! - `ComposeError`: what `GroupComposer::create` reports to its caller

use thiserror::Error;

use crate::config::Labels;
use crate::store::StoreError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Group name is empty")]
    EmptyName,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Roster feed interrupted: {0}")]
    Interrupted(StoreError),

    #[error("Roster resubscribe gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl SyncError {
    /// `Interrupted` is followed by an automatic resubscribe; `RetriesExhausted`
    /// ends the subscription.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncError::RetriesExhausted { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Invalid group: {0}")]
    Validation(#[from] ValidationError),

    #[error("Group creation failed: {0}")]
    Write(#[from] StoreError),
}

impl ComposeError {
    /// Both kinds leave the selection intact, so the user can fix and retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ComposeError::Validation(_) => true,
            ComposeError::Write(StoreError::Closed) => false,
            ComposeError::Write(_) => true,
        }
    }

    /// Blocking notice to show the user for this failure.
    pub fn notice(&self, labels: &Labels) -> Notice {
        match self {
            ComposeError::Validation(ValidationError::EmptyName) => Notice {
                title: labels.empty_name_title.clone(),
                message: labels.empty_name_message.clone(),
                acknowledge: labels.acknowledge.clone(),
            },
            ComposeError::Write(_) => Notice {
                title: labels.write_failed_title.clone(),
                message: labels.write_failed_message.clone(),
                acknowledge: labels.acknowledge.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A modal message with a single acknowledgement action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub acknowledge: String,
}
