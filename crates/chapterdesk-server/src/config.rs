use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Server settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub admin_password: String,
    pub admin_email: String,
    pub sweep_interval_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("CHAPTERDESK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("CHAPTERDESK_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("CHAPTERDESK_PORT must be a port number")?;
        let db_path: PathBuf = std::env::var("CHAPTERDESK_DB_PATH")
            .unwrap_or_else(|_| "chapterdesk.db".into())
            .into();
        let admin_password = std::env::var("CHAPTERDESK_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into());
        let admin_email =
            std::env::var("CHAPTERDESK_ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".into());
        let sweep_interval_secs = std::env::var("CHAPTERDESK_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Ok(Self {
            host,
            port,
            db_path,
            admin_password,
            admin_email,
            sweep_interval_secs,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}
