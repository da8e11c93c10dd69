use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::Database;
use crate::models::{SessionRow, UserRow};
use crate::store::AuthStore;

impl AuthStore for Database {
    // -- Users --

    fn find_users_by_username(&self, username: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| query_users_by_username(conn, username))
    }

    fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, email, role, chapter_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    user.username,
                    user.password,
                    user.email,
                    user.role,
                    user.chapter_id
                ],
            )?;
            Ok(())
        })
    }

    fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    // -- Sessions --

    fn create_session(&self, session: &SessionRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_json, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    session.token,
                    session.user_json,
                    session.created_at.timestamp_millis(),
                    session.expires_at.timestamp_millis()
                ],
            )?;
            Ok(())
        })
    }

    fn get_session(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| query_session(conn, token))
    }

    fn delete_session(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(removed > 0)
        })
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                [now.timestamp_millis()],
            )?;
            Ok(removed)
        })
    }

    // -- Chapters --

    fn get_chapter(&self, chapter_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT content_json FROM chapters WHERE chapter_id = ?1",
                [chapter_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    fn put_chapter(
        &self,
        chapter_id: &str,
        content_json: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chapters (chapter_id, content_json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chapter_id) DO UPDATE SET
                    content_json = excluded.content_json,
                    updated_at = excluded.updated_at",
                rusqlite::params![chapter_id, content_json, updated_at.timestamp_millis()],
            )?;
            Ok(())
        })
    }
}

fn query_users_by_username(conn: &Connection, username: &str) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, email, role, chapter_id
         FROM users
         WHERE username = ?1
         ORDER BY seq ASC",
    )?;

    let rows = stmt
        .query_map([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                email: row.get(3)?,
                role: row.get(4)?,
                chapter_id: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_session(conn: &Connection, token: &str) -> Result<Option<SessionRow>> {
    let mut stmt = conn.prepare(
        "SELECT token, user_json, created_at, expires_at FROM sessions WHERE token = ?1",
    )?;

    let row = stmt
        .query_row([token], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .optional()?;

    row.map(|(token, user_json, created_at, expires_at)| {
        Ok(SessionRow {
            token,
            user_json,
            created_at: from_millis(created_at)?,
            expires_at: from_millis(expires_at)?,
        })
    })
    .transpose()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("Corrupt timestamp {}", ms))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
