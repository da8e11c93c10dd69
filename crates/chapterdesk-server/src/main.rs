mod config;
mod sweep;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use chapterdesk_api::admin::bootstrap_admin;
use chapterdesk_api::auth::{AppState, AppStateInner};
use chapterdesk_api::routes::router;
use chapterdesk_api::session::{SessionService, SystemClock};
use chapterdesk_db::{AuthStore, Database};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chapterdesk_server=debug,chapterdesk_api=debug,chapterdesk_db=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Init database
    let store: Arc<dyn AuthStore> = Arc::new(Database::open(&config.db_path)?);

    if bootstrap_admin(store.as_ref(), &config.admin_password, &config.admin_email)?
        && config.uses_default_admin_password()
    {
        warn!("Admin was bootstrapped with the default password; set CHAPTERDESK_ADMIN_PASSWORD");
    }

    let sessions = SessionService::new(store.clone(), Arc::new(SystemClock));
    tokio::spawn(sweep::run_sweep_loop(sessions.clone(), config.sweep_interval_secs));

    let state: AppState = Arc::new(AppStateInner::new(store, sessions));

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Chapterdesk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
