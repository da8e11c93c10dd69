use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- username is deliberately not UNIQUE: login resolves duplicates by
        -- insertion order (seq).
        CREATE TABLE IF NOT EXISTS users (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT,
            username    TEXT NOT NULL,
            password    TEXT NOT NULL,
            email       TEXT NOT NULL DEFAULT '',
            role        TEXT NOT NULL DEFAULT '',
            chapter_id  TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_users_username
            ON users(username);

        -- Timestamps are unix milliseconds (UTC).
        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_json   TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            expires_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_expires
            ON sessions(expires_at);

        CREATE TABLE IF NOT EXISTS chapters (
            chapter_id    TEXT PRIMARY KEY,
            content_json  TEXT NOT NULL,
            updated_at    INTEGER NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
