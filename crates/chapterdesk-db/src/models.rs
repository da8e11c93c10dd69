/// Database row types — these map directly to stored rows.
/// Distinct from chapterdesk-types API models to keep the DB layer independent.
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    /// Rows provisioned by hand may carry no id.
    pub id: Option<String>,
    pub username: String,
    /// Argon2 PHC string, or plaintext for legacy rows.
    pub password: String,
    pub email: String,
    pub role: String,
    pub chapter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub token: String,
    /// Serialized user snapshot taken at login.
    pub user_json: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRow {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
