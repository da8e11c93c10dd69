use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

use crate::models::{SessionRow, UserRow};
use crate::store::AuthStore;

/// In-process store: sessions keyed by token, users indexed by username.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: Vec<UserRow>,
    /// username -> positions in `users`, insertion order
    by_username: HashMap<String, Vec<usize>>,
    sessions: HashMap<String, SessionRow>,
    chapters: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MemoryInner) -> T,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow!("Memory store lock poisoned: {}", e))?;
        Ok(f(&mut inner))
    }
}

impl AuthStore for MemoryStore {
    fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRow>> {
        self.with_inner(|inner| {
            inner
                .by_username
                .get(username)
                .map(|idxs| idxs.iter().map(|&i| inner.users[i].clone()).collect())
                .unwrap_or_default()
        })
    }

    fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_inner(|inner| {
            let idx = inner.users.len();
            inner.users.push(user.clone());
            inner
                .by_username
                .entry(user.username.clone())
                .or_default()
                .push(idx);
        })
    }

    fn count_users(&self) -> Result<u64> {
        self.with_inner(|inner| inner.users.len() as u64)
    }

    fn create_session(&self, session: &SessionRow) -> Result<()> {
        self.with_inner(|inner| {
            inner.sessions.insert(session.token.clone(), session.clone());
        })
    }

    fn get_session(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_inner(|inner| inner.sessions.get(token).cloned())
    }

    fn delete_session(&self, token: &str) -> Result<bool> {
        self.with_inner(|inner| inner.sessions.remove(token).is_some())
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_inner(|inner| {
            let before = inner.sessions.len();
            inner.sessions.retain(|_, s| !s.is_expired_at(now));
            before - inner.sessions.len()
        })
    }

    fn get_chapter(&self, chapter_id: &str) -> Result<Option<String>> {
        self.with_inner(|inner| inner.chapters.get(chapter_id).cloned())
    }

    fn put_chapter(
        &self,
        chapter_id: &str,
        content_json: &str,
        _updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_inner(|inner| {
            inner
                .chapters
                .insert(chapter_id.to_string(), content_json.to_string());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(token: &str, expires_at: DateTime<Utc>) -> SessionRow {
        SessionRow {
            token: token.to_string(),
            user_json: "{}".to_string(),
            created_at: expires_at - Duration::hours(24),
            expires_at,
        }
    }

    #[test]
    fn username_index_keeps_insertion_order() {
        let store = MemoryStore::new();
        for (id, name) in [("1", "kim"), ("2", "lee"), ("3", "kim")] {
            store
                .create_user(&UserRow {
                    id: Some(id.to_string()),
                    username: name.to_string(),
                    password: "pw".to_string(),
                    email: String::new(),
                    role: String::new(),
                    chapter_id: None,
                })
                .unwrap();
        }

        let ids: Vec<_> = store
            .find_users_by_username("kim")
            .unwrap()
            .into_iter()
            .filter_map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(store.find_users_by_username("park").unwrap().is_empty());
    }

    #[test]
    fn sweep_keeps_session_expiring_exactly_now() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.create_session(&session("past", now - Duration::seconds(1))).unwrap();
        store.create_session(&session("edge", now)).unwrap();
        store.create_session(&session("future", now + Duration::hours(3))).unwrap();

        assert_eq!(store.sweep_expired(now).unwrap(), 1);
        assert!(store.get_session("edge").unwrap().is_some());
        assert!(store.get_session("future").unwrap().is_some());
        assert!(store.get_session("past").unwrap().is_none());
    }
}
