//! One group-creation screen, from entry to teardown.
//!
//! The session subscribes to the roster exactly once when opened and
//! releases the subscription when closed or dropped, however often the host
//! re-renders. Everything runs on the caller's task: roster snapshots are
//! pulled with `next_roster`, taps are applied synchronously.
//!
//! Each applied snapshot replaces the roster and drops selected users that
//! are no longer offered.

use crate::badge::HeaderBadge;
use crate::composer::{GroupComposer, Navigator};
use crate::config::Labels;
use crate::error::{ComposeError, SyncError};
use crate::ids::{GroupId, UserId};
use crate::roster::{RosterSnapshot, RosterSubscription, RosterSync};
use crate::selection::SelectionModel;
use crate::store::ChatStore;
use crate::user::CurrentUser;

// ─── Presentation contract (app implements) ──────────────────────────────────

/// Strings and state for one selectable roster row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectableRow {
    /// Pass back to `GroupScreenSession::press` when the row is tapped.
    pub user_id: UserId,
    pub title: String,
    pub subtitle: String,
    pub selected: bool,
}

pub trait RowPresenter {
    fn render_selectable(&mut self, row: &SelectableRow);
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct GroupScreenSession<S, N> {
    current: CurrentUser,
    labels: Labels,
    subscription: Option<RosterSubscription>,
    roster: RosterSnapshot,
    selection: SelectionModel,
    group_name: String,
    composer: GroupComposer<S, N>,
}

impl<S: ChatStore, N: Navigator> GroupScreenSession<S, N> {
    /// Enter the screen: opens the single roster subscription. Every string
    /// the screen shows comes from the sync's labels.
    pub fn open(sync: &RosterSync, composer: GroupComposer<S, N>, current: CurrentUser) -> Self {
        let subscription = sync.subscribe(current.clone());
        GroupScreenSession {
            current,
            labels: sync.labels().clone(),
            subscription: Some(subscription),
            roster: RosterSnapshot::default(),
            selection: SelectionModel::new(),
            group_name: String::new(),
            composer,
        }
    }

    /// Wait for and apply the next roster snapshot. Returns the number of
    /// selectable users, or `None` once the subscription has ended or the
    /// session was closed.
    pub async fn next_roster(&mut self) -> Option<Result<usize, SyncError>> {
        let subscription = self.subscription.as_mut()?;
        match subscription.next().await? {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Some(Ok(self.roster.len()))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn apply_snapshot(&mut self, snapshot: RosterSnapshot) {
        let dropped = self.selection.retain_ids(|id| snapshot.contains(id));
        if dropped > 0 {
            log::info!("Deselected {} users no longer in the roster", dropped);
        }
        self.roster = snapshot;
    }

    // ── Selection ───────────────────────────────────────────────────────────

    /// Row tap. Toggles the user if the roster currently offers it; returns
    /// whether the user is selected afterwards.
    pub fn press(&mut self, id: &UserId) -> bool {
        match self.roster.get(id) {
            Some(entry) => self.selection.toggle(&entry.user),
            None => {
                log::debug!("Ignoring press on {} (not in roster)", id);
                false
            }
        }
    }

    /// Background tap: deselect everyone.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn badge(&self) -> HeaderBadge {
        HeaderBadge::for_selection(&self.selection)
    }

    // ── Roster presentation ─────────────────────────────────────────────────

    pub fn roster(&self) -> &RosterSnapshot {
        &self.roster
    }

    pub fn rows(&self) -> Vec<SelectableRow> {
        self.roster
            .entries()
            .iter()
            .map(|entry| SelectableRow {
                user_id: entry.user.id.clone(),
                title: entry.display.title.clone(),
                subtitle: self.labels.subtitle.clone(),
                selected: self.selection.is_selected(&entry.user.id),
            })
            .collect()
    }

    pub fn render_rows<P: RowPresenter>(&self, presenter: &mut P) {
        for row in self.rows() {
            presenter.render_selectable(&row);
        }
    }

    /// Label to show instead of rows when nobody can be selected.
    pub fn empty_roster_label(&self) -> Option<&str> {
        self.roster
            .is_empty()
            .then_some(self.labels.empty_roster.as_str())
    }

    // ── Group name and creation ─────────────────────────────────────────────

    pub fn set_group_name(&mut self, text: impl Into<String>) {
        self.group_name = text.into();
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn group_name_placeholder(&self) -> &str {
        &self.labels.group_name_placeholder
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// The create action is offered only while someone is selected.
    pub fn can_create(&self) -> bool {
        !self.selection.is_empty()
    }

    pub async fn create_group(&mut self) -> Result<GroupId, ComposeError> {
        self.composer
            .create(&self.group_name, &mut self.selection, &self.current)
            .await
    }

    pub fn composer(&self) -> &GroupComposer<S, N> {
        &self.composer
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active())
    }

    /// Leave the screen: releases the roster subscription.
    pub fn close(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
