//! In-process backend with live `users` queries and an append-only `chats`
//! collection.
//!
//! Handles are cheap clones over shared state, so a test can keep one handle
//! to mutate the roster while the screen core holds another.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use super::{ChatStore, OrderDirection, RosterQuery, StoreError, UserDirectory, UserFeed};
use crate::group::{ChatDocument, Group};
use crate::ids::{GroupId, UserId};
use crate::user::{User, UserDoc};

struct Watcher {
    query: RosterQuery,
    tx: watch::Sender<Result<Vec<User>, StoreError>>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, UserDoc>,
    watchers: Vec<Watcher>,
    chats: Vec<Group>,
    /// Failures returned by the next `create_chat` calls, in order.
    write_failures: VecDeque<StoreError>,
    /// Failures returned by the next `watch_users` calls, in order.
    watch_failures: VecDeque<StoreError>,
}

impl Inner {
    fn snapshot(&self, query: &RosterQuery) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|(id, doc)| User::from_doc(id.clone(), doc.clone()))
            .collect();
        users.sort_by(|a, b| compare_users(a, b, query));
        users
    }

    /// Overwrite every live query with a fresh snapshot; forget the released ones.
    fn broadcast(&mut self) {
        let snapshots: Vec<Vec<User>> = self.watchers.iter().map(|w| self.snapshot(&w.query)).collect();
        let mut kept = Vec::with_capacity(self.watchers.len());
        for (watcher, users) in self.watchers.drain(..).zip(snapshots) {
            if watcher.tx.send(Ok(users)).is_ok() {
                kept.push(watcher);
            }
        }
        self.watchers = kept;
    }
}

/// Order by the query key with documents missing the key last, tie-broken by id.
fn compare_users(a: &User, b: &User, query: &RosterQuery) -> Ordering {
    let key = |u: &User| -> Option<String> {
        match query.order_key.as_str() {
            "name" => u.name.clone(),
            "email" => u.email.clone(),
            _ => Some(u.id.as_str().to_string()),
        }
    };
    let by_key = match (key(a), key(b)) {
        (Some(x), Some(y)) => match query.direction {
            OrderDirection::Ascending => x.cmp(&y),
            OrderDirection::Descending => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_key.then_with(|| a.id.cmp(&b.id))
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Insert or replace a `users` document and notify live queries.
    pub fn put_user(&self, id: impl Into<UserId>, doc: UserDoc) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.users.insert(id.into(), doc);
        inner.broadcast();
        Ok(())
    }

    /// Delete a `users` document. Returns whether it existed.
    pub fn remove_user(&self, id: &UserId) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let existed = inner.users.remove(id).is_some();
        if existed {
            inner.broadcast();
        }
        Ok(existed)
    }

    /// Break every live query with `error`. Feeds are closed afterwards.
    pub fn interrupt_feeds(&self, error: StoreError) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for watcher in inner.watchers.drain(..) {
            let _ = watcher.tx.send(Err(error.clone()));
        }
        Ok(())
    }

    /// Close every live query without reporting an error.
    pub fn close_feeds(&self) -> Result<(), StoreError> {
        self.lock()?.watchers.clear();
        Ok(())
    }

    /// Make the next `create_chat` fail with `error`.
    pub fn fail_next_write(&self, error: StoreError) -> Result<(), StoreError> {
        self.lock()?.write_failures.push_back(error);
        Ok(())
    }

    /// Make the next `watch_users` fail with `error`.
    pub fn fail_next_watch(&self, error: StoreError) -> Result<(), StoreError> {
        self.lock()?.watch_failures.push_back(error);
        Ok(())
    }

    /// Number of live queries whose consumer is still attached.
    pub fn live_query_count(&self) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        inner.watchers.retain(|w| !w.tx.is_closed());
        Ok(inner.watchers.len())
    }

    /// All created groups in creation order.
    pub fn chats(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.lock()?.chats.clone())
    }

    pub fn chat(&self, id: &GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.lock()?.chats.iter().find(|g| &g.id == id).cloned())
    }

    fn insert_chat(&self, document: ChatDocument) -> Result<GroupId, StoreError> {
        let mut inner = self.lock()?;
        if let Some(error) = inner.write_failures.pop_front() {
            return Err(error);
        }
        let id = GroupId::generate();
        inner.chats.push(Group {
            id: id.clone(),
            document,
        });
        Ok(id)
    }
}

impl UserDirectory for MemoryStore {
    fn watch_users(&self, query: &RosterQuery) -> Result<UserFeed, StoreError> {
        let mut inner = self.lock()?;
        if let Some(error) = inner.watch_failures.pop_front() {
            return Err(error);
        }
        // Live queries start out holding the current contents.
        let (tx, rx) = watch::channel(Ok(inner.snapshot(query)));
        inner.watchers.push(Watcher {
            query: query.clone(),
            tx,
        });
        Ok(rx)
    }
}

impl ChatStore for MemoryStore {
    async fn create_chat(&self, document: ChatDocument) -> Result<GroupId, StoreError> {
        // Acknowledgement arrives asynchronously.
        tokio::task::yield_now().await;
        self.insert_chat(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupName;
    use crate::user::CurrentUser;
    use chrono::Utc;

    fn doc(name: Option<&str>, email: Option<&str>) -> UserDoc {
        UserDoc {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn names(users: &[User]) -> Vec<String> {
        users.iter().map(|u| u.id.to_string()).collect()
    }

    fn current(feed: &mut UserFeed) -> Vec<User> {
        feed.borrow_and_update().clone().unwrap()
    }

    #[tokio::test]
    async fn test_initial_snapshot_ordered_by_name() {
        let store = MemoryStore::new();
        store.put_user("c", doc(Some("Carla"), None)).unwrap();
        store.put_user("a", doc(Some("Ana"), None)).unwrap();
        store.put_user("x", doc(None, Some("x@example.com"))).unwrap();
        store.put_user("b", doc(Some("Bruno"), None)).unwrap();

        let mut feed = store.watch_users(&RosterQuery::default()).unwrap();
        assert_eq!(names(&current(&mut feed)), vec!["a", "b", "c", "x"]);
    }

    #[tokio::test]
    async fn test_descending_keeps_missing_last() {
        let store = MemoryStore::new();
        store.put_user("a", doc(Some("Ana"), None)).unwrap();
        store.put_user("n", doc(None, None)).unwrap();
        store.put_user("b", doc(Some("Bruno"), None)).unwrap();

        let query = RosterQuery {
            order_key: "name".into(),
            direction: OrderDirection::Descending,
        };
        let mut feed = store.watch_users(&query).unwrap();
        assert_eq!(names(&current(&mut feed)), vec!["b", "a", "n"]);
    }

    #[tokio::test]
    async fn test_changes_push_full_snapshots() {
        let store = MemoryStore::new();
        store.put_user("a", doc(Some("Ana"), None)).unwrap();
        let mut feed = store.watch_users(&RosterQuery::default()).unwrap();
        current(&mut feed);

        store.put_user("b", doc(Some("Bruno"), None)).unwrap();
        feed.changed().await.unwrap();
        assert_eq!(names(&current(&mut feed)), vec!["a", "b"]);

        assert!(store.remove_user(&UserId::from("a")).unwrap());
        feed.changed().await.unwrap();
        assert_eq!(names(&current(&mut feed)), vec!["b"]);

        assert!(!store.remove_user(&UserId::from("zzz")).unwrap());
        assert!(!feed.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_unread_changes_collapse_to_latest() {
        let store = MemoryStore::new();
        let mut feed = store.watch_users(&RosterQuery::default()).unwrap();
        current(&mut feed);

        store.put_user("a", doc(Some("Ana"), None)).unwrap();
        store.remove_user(&UserId::from("a")).unwrap();
        store.put_user("a", doc(Some("Ana"), None)).unwrap();
        for i in 0..100 {
            store.put_user("b", doc(Some(format!("Bruno {i}").as_str()), None)).unwrap();
        }

        feed.changed().await.unwrap();
        let users = current(&mut feed);
        assert_eq!(names(&users), vec!["a", "b"]);
        assert_eq!(users[1].name.as_deref(), Some("Bruno 99"));
        assert!(!feed.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_dropped_feed_is_released() {
        let store = MemoryStore::new();
        let feed = store.watch_users(&RosterQuery::default()).unwrap();
        assert_eq!(store.live_query_count().unwrap(), 1);
        drop(feed);
        assert_eq!(store.live_query_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_closes_feeds() {
        let store = MemoryStore::new();
        let mut feed = store.watch_users(&RosterQuery::default()).unwrap();
        current(&mut feed);

        store.interrupt_feeds(StoreError::Unavailable("offline".into())).unwrap();
        feed.changed().await.unwrap();
        assert!(matches!(*feed.borrow_and_update(), Err(StoreError::Unavailable(_))));
        assert!(feed.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_close_feeds_ends_without_error() {
        let store = MemoryStore::new();
        let mut feed = store.watch_users(&RosterQuery::default()).unwrap();
        current(&mut feed);

        store.close_feeds().unwrap();
        assert!(feed.changed().await.is_err());
        assert!(feed.borrow().is_ok());
        assert_eq!(store.live_query_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_chat_generates_ids_without_dedup() {
        let store = MemoryStore::new();
        let me = CurrentUser::new("me@example.com", None);
        let make = || ChatDocument::new_group(GroupName::parse("Same").unwrap(), &me, &[], Utc::now());

        let first = store.create_chat(make()).await.unwrap();
        let second = store.create_chat(make()).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.chats().unwrap().len(), 2);
        assert_eq!(store.chat(&first).unwrap().unwrap().name(), "Same");
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let store = MemoryStore::new();
        store.fail_next_watch(StoreError::Closed).unwrap();
        assert_eq!(store.watch_users(&RosterQuery::default()).unwrap_err(), StoreError::Closed);
        assert!(store.watch_users(&RosterQuery::default()).is_ok());

        store.fail_next_write(StoreError::WriteRejected("denied".into())).unwrap();
        let me = CurrentUser::new("me@example.com", None);
        let doc = ChatDocument::new_group(GroupName::parse("G").unwrap(), &me, &[], Utc::now());
        assert!(store.create_chat(doc).await.is_err());
        assert!(store.chats().unwrap().is_empty());
    }
}
