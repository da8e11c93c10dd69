//! Session lifecycle over an [`AuthStore`].
//!
//! Sessions carry a snapshot of the user taken at login and a fixed expiry
//! set at creation. Activity never extends a session; logout and expiry are
//! the only ways one goes away.

use std::sync::{Arc, Mutex};

use anyhow::{Context, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{debug, info, warn};

use chapterdesk_db::AuthStore;
use chapterdesk_db::models::SessionRow;
use chapterdesk_types::api::UserView;

/// Session lifetime, fixed at creation.
pub const SESSION_TTL_HOURS: i64 = 24;

const TOKEN_BYTES: usize = 32;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to simulate expiry.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

/// A live session as handed to callers.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserView,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn AuthStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn AuthStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a session for `user` under a freshly generated token.
    pub fn issue(&self, user: &UserView) -> anyhow::Result<Session> {
        self.store(&generate_token(), user)
    }

    /// Persist a session for `token`, then sweep expired sessions.
    pub fn store(&self, token: &str, user: &UserView) -> anyhow::Result<Session> {
        // Stores keep millisecond precision; truncate so the expiry handed
        // back matches the stored one.
        let now = self.now();
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let expires_at = created_at + self.ttl;

        let row = SessionRow {
            token: token.to_string(),
            user_json: serde_json::to_string(user).context("serialize user snapshot")?,
            created_at,
            expires_at,
        };
        self.store.create_session(&row)?;
        info!("Session created for {} (expires {})", user.username, expires_at);

        if let Err(e) = self.cleanup_expired() {
            warn!("Sweep after session creation failed: {:#}", e);
        }

        Ok(Session {
            token: row.token,
            user: user.clone(),
            created_at,
            expires_at,
        })
    }

    /// Look a session up by token. Expired sessions are still returned.
    pub fn get(&self, token: &str) -> anyhow::Result<Option<Session>> {
        let Some(row) = self.store.get_session(token)? else {
            return Ok(None);
        };

        let user: UserView = serde_json::from_str(&row.user_json)
            .map_err(|e| anyhow!("Corrupt user snapshot in session: {}", e))?;

        Ok(Some(Session {
            token: row.token,
            user,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }))
    }

    pub fn is_expired(&self, session: &Session) -> bool {
        session.expires_at < self.now()
    }

    /// The session for `token` if it exists and has not expired.
    pub fn validate(&self, token: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.get(token)?.filter(|s| !self.is_expired(s)))
    }

    /// Remove a session. Unknown tokens are not an error.
    pub fn revoke(&self, token: &str) -> anyhow::Result<()> {
        if self.store.delete_session(token)? {
            info!("Session revoked");
        } else {
            debug!("Logout for unknown session token");
        }
        Ok(())
    }

    pub fn cleanup_expired(&self) -> anyhow::Result<usize> {
        let removed = self.store.sweep_expired(self.now())?;
        if removed > 0 {
            info!("Swept {} expired sessions", removed);
        }
        Ok(removed)
    }
}

/// 256 random bits, base64url without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}
