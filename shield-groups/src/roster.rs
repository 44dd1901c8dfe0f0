/// Live roster synchronization.
///
/// `RosterSync` opens one live ordered query against the `users` collection
/// and hands out a `RosterSubscription`. Each item pulled from the
/// subscription is a complete `RosterSnapshot` that replaces the previous
/// one: a user deleted in the backend simply does not appear in the next
/// snapshot. Changes made between two pulls collapse into the newest
/// snapshot.
///
/// Snapshots exclude the acting user (matched by email) and carry each
/// entry's display identity, resolved once when the snapshot is built.
///
/// Feed interruptions are reported once as `SyncError::Interrupted`, then
/// the query is re-opened after `RosterConfig::resubscribe_delay`. After
/// `max_resubscribe_attempts` attempts without a snapshot the subscription
/// reports `SyncError::RetriesExhausted` and ends.
///
/// Dropping the subscription (or calling `unsubscribe`) releases the query;
/// no snapshot is delivered afterwards.

use std::sync::Arc;

use crate::config::{GroupsConfig, Labels, RosterConfig};
use crate::error::SyncError;
use crate::ids::UserId;
use crate::store::{RosterQuery, StoreError, UserDirectory, UserFeed};
use crate::user::{CurrentUser, DisplayIdentity, User};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub user: User,
    pub display: DisplayIdentity,
}

/// One full, ordered view of the selectable roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    entries: Vec<RosterEntry>,
}

impl RosterSnapshot {
    /// Build from store order, dropping the acting user.
    pub fn from_users(users: Vec<User>, current: &CurrentUser, labels: &Labels) -> Self {
        let entries = users
            .into_iter()
            .filter(|u| !u.is_current(current))
            .map(|user| {
                let display = DisplayIdentity::for_user(&user, labels);
                RosterEntry { user, display }
            })
            .collect();
        RosterSnapshot { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &UserId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.user.id == id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.get(id).is_some()
    }
}

// ---------------------------------------------------------------------------
// RosterSync
// ---------------------------------------------------------------------------

pub struct RosterSync {
    directory: Arc<dyn UserDirectory>,
    config: RosterConfig,
    labels: Labels,
}

impl RosterSync {
    pub fn new(directory: Arc<dyn UserDirectory>, config: &GroupsConfig) -> Self {
        RosterSync {
            directory,
            config: config.roster.clone(),
            labels: config.labels.clone(),
        }
    }

    /// Labels used for every string on the screen this sync feeds.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Open the live query for `current`. Never fails: if the store refuses
    /// the query, the first `next()` reports it and the retry path takes over.
    pub fn subscribe(&self, current: CurrentUser) -> RosterSubscription {
        let query = self.config.query();
        let (feed, pending_error) = match self.directory.watch_users(&query) {
            Ok(feed) => {
                log::info!(
                    "Roster subscription opened (order by {} {:?})",
                    query.order_key,
                    query.direction
                );
                (Some(feed), None)
            }
            Err(e) => {
                log::warn!("Roster subscription could not be opened: {}", e);
                (None, Some(e))
            }
        };

        RosterSubscription {
            directory: Arc::clone(&self.directory),
            query,
            config: self.config.clone(),
            labels: self.labels.clone(),
            current,
            unread: feed.is_some(),
            feed,
            pending_error,
            attempts: 0,
            finished: false,
        }
    }
}

// ---------------------------------------------------------------------------
// RosterSubscription
// ---------------------------------------------------------------------------

pub struct RosterSubscription {
    directory: Arc<dyn UserDirectory>,
    query: RosterQuery,
    config: RosterConfig,
    labels: Labels,
    current: CurrentUser,
    feed: Option<UserFeed>,
    /// The feed's current value has not been delivered yet.
    unread: bool,
    pending_error: Option<StoreError>,
    /// Resubscribe attempts since the last delivered snapshot.
    attempts: u32,
    finished: bool,
}

impl RosterSubscription {
    /// Wait for the next snapshot. `None` once the subscription has ended.
    pub async fn next(&mut self) -> Option<Result<RosterSnapshot, SyncError>> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(error) = self.pending_error.take() {
                return Some(Err(SyncError::Interrupted(error)));
            }

            if self.feed.is_none() {
                if let Err(e) = self.resubscribe().await {
                    return Some(Err(e));
                }
                continue;
            }

            let received = match self.feed.as_mut() {
                Some(feed) if self.unread => {
                    self.unread = false;
                    Some(feed.borrow_and_update().clone())
                }
                Some(feed) => match feed.changed().await {
                    Ok(()) => Some(feed.borrow_and_update().clone()),
                    Err(_) => None,
                },
                None => continue,
            };

            match received {
                Some(Ok(users)) => {
                    self.attempts = 0;
                    let snapshot = RosterSnapshot::from_users(users, &self.current, &self.labels);
                    log::debug!("Roster snapshot: {} selectable users", snapshot.len());
                    return Some(Ok(snapshot));
                }
                Some(Err(e)) => {
                    log::warn!("Roster feed interrupted: {}", e);
                    self.feed = None;
                    return Some(Err(SyncError::Interrupted(e)));
                }
                None => {
                    log::warn!("Roster feed closed by store");
                    self.feed = None;
                    return Some(Err(SyncError::Interrupted(StoreError::Closed)));
                }
            }
        }
    }

    async fn resubscribe(&mut self) -> Result<(), SyncError> {
        if self.attempts >= self.config.max_resubscribe_attempts {
            self.finished = true;
            log::error!("Roster resubscribe gave up after {} attempts", self.attempts);
            return Err(SyncError::RetriesExhausted {
                attempts: self.attempts,
            });
        }

        tokio::time::sleep(self.config.resubscribe_delay).await;
        self.attempts += 1;

        match self.directory.watch_users(&self.query) {
            Ok(feed) => {
                log::info!("Roster resubscribed (attempt {})", self.attempts);
                self.feed = Some(feed);
                self.unread = true;
            }
            Err(e) => log::warn!("Roster resubscribe attempt {} failed: {}", self.attempts, e),
        }
        Ok(())
    }

    /// Whether snapshots may still arrive.
    pub fn is_active(&self) -> bool {
        !self.finished
    }

    /// Release the live query. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for RosterSubscription {
    fn drop(&mut self) {
        log::info!("Roster subscription released");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
