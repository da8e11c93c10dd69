use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{SessionRow, UserRow};

/// Storage interface the auth service runs against.
///
/// Implementations must make each call atomic on its own; nothing above this
/// layer coordinates across calls.
pub trait AuthStore: Send + Sync {
    /// All users with exactly this username, in insertion order.
    fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRow>>;

    fn create_user(&self, user: &UserRow) -> Result<()>;

    fn count_users(&self) -> Result<u64>;

    fn create_session(&self, session: &SessionRow) -> Result<()>;

    fn get_session(&self, token: &str) -> Result<Option<SessionRow>>;

    /// Returns whether a session was removed.
    fn delete_session(&self, token: &str) -> Result<bool>;

    /// Delete every session whose expiry is before `now`. Returns the count.
    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    fn get_chapter(&self, chapter_id: &str) -> Result<Option<String>>;

    fn put_chapter(&self, chapter_id: &str, content_json: &str, updated_at: DateTime<Utc>)
    -> Result<()>;
}
