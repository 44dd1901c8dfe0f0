/// Selection state for the group being composed.
///
/// The selection is a single ordered list of entries, each holding the user
/// record resolved when it was selected. The id set and the count are
/// derived from that list, so they cannot disagree with the records.
/// Selection order is preserved; it becomes member order in the new group.

use crate::ids::UserId;
use crate::user::User;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionEntry {
    user: User,
}

impl SelectionEntry {
    pub fn id(&self) -> &UserId {
        &self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionModel {
    entries: Vec<SelectionEntry>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `user` if unselected, otherwise deselect it.
    /// Returns whether the user is selected afterwards.
    pub fn toggle(&mut self, user: &User) -> bool {
        match self.position(&user.id) {
            Some(index) => {
                self.entries.remove(index);
                false
            }
            None => {
                self.entries.push(SelectionEntry { user: user.clone() });
                true
            }
        }
    }

    pub fn is_selected(&self, id: &UserId) -> bool {
        self.position(id).is_some()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Selection cleared ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in selection order.
    pub fn ids(&self) -> impl Iterator<Item = &UserId> {
        self.entries.iter().map(SelectionEntry::id)
    }

    /// Selected records in selection order.
    pub fn users(&self) -> Vec<User> {
        self.entries.iter().map(|e| e.user.clone()).collect()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Drop every entry whose id fails `keep`. Returns how many were dropped.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(&UserId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| keep(&e.user.id));
        before - self.entries.len()
    }

    fn position(&self, id: &UserId) -> Option<usize> {
        self.entries.iter().position(|e| &e.user.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user(id: &str) -> User {
        User::new(id, Some(id), Some(&format!("{id}@example.com")))
    }

    fn assert_consistent(sel: &SelectionModel) {
        let ids: BTreeSet<&UserId> = sel.ids().collect();
        let record_ids: BTreeSet<&UserId> = sel.entries().iter().map(|e| &e.user().id).collect();
        assert_eq!(ids.len(), sel.count());
        assert_eq!(ids, record_ids);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut sel = SelectionModel::new();
        let a = user("a");

        assert!(sel.toggle(&a));
        assert!(sel.is_selected(&a.id));
        assert_eq!(sel.count(), 1);

        assert!(!sel.toggle(&a));
        assert!(!sel.is_selected(&a.id));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let mut sel = SelectionModel::new();
        sel.toggle(&user("a"));
        sel.toggle(&user("b"));
        let before = sel.clone();

        sel.toggle(&user("c"));
        sel.toggle(&user("c"));
        assert_eq!(sel, before);

        sel.toggle(&user("a"));
        sel.toggle(&user("a"));
        // re-selecting moves "a" to the end; the set is unchanged
        let ids: Vec<&str> = sel.ids().map(UserId::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_ids_and_records_stay_consistent() {
        let mut sel = SelectionModel::new();
        // deterministic pseudo-random toggle sequence over 7 users
        let mut x: u32 = 17;
        for _ in 0..500 {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = format!("u{}", (x >> 16) % 7);
            sel.toggle(&user(&id));
            assert_consistent(&sel);
        }
    }

    #[test]
    fn test_toggle_uses_id_identity() {
        let mut sel = SelectionModel::new();
        sel.toggle(&User::new("a", Some("Old"), None));
        // same id with different fields deselects
        assert!(!sel.toggle(&User::new("a", Some("New"), None)));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_selection_order_preserved() {
        let mut sel = SelectionModel::new();
        for id in ["c", "a", "b"] {
            sel.toggle(&user(id));
        }
        let names: Vec<String> = sel.users().into_iter().map(|u| u.id.to_string()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionModel::new();
        sel.toggle(&user("a"));
        sel.toggle(&user("b"));
        sel.clear();
        assert_eq!(sel.count(), 0);
        assert_eq!(sel.ids().count(), 0);
        assert!(sel.entries().is_empty());
    }

    #[test]
    fn test_retain_ids() {
        let mut sel = SelectionModel::new();
        for id in ["a", "b", "c"] {
            sel.toggle(&user(id));
        }
        let dropped = sel.retain_ids(|id| id.as_str() != "b");
        assert_eq!(dropped, 1);
        assert!(!sel.is_selected(&UserId::from("b")));
        assert_consistent(&sel);
    }
}
