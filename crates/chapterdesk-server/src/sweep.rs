use std::time::Duration;

use chapterdesk_api::session::SessionService;
use tracing::{info, warn};

/// Periodically deletes expired sessions, on top of the sweep every login
/// already triggers.
pub async fn run_sweep_loop(sessions: SessionService, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        let svc = sessions.clone();
        match tokio::task::spawn_blocking(move || svc.cleanup_expired()).await {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Sweep: pruned {} expired sessions", count);
                }
            }
            Ok(Err(e)) => warn!("Sweep error: {}", e),
            Err(e) => warn!("Sweep task failed: {}", e),
        }
    }
}
