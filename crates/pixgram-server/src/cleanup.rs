use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use pixgram_db::Database;

/// Background task that drops blacklist entries whose tokens have expired.
pub async fn run_cleanup_loop(db: Arc<Database>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let db = db.clone();
        match tokio::task::spawn_blocking(move || db.purge_expired_revocations()).await {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Cleanup: purged {} expired token revocations", count);
                }
            }
            Ok(Err(e)) => warn!("Cleanup error: {}", e),
            Err(e) => warn!("Cleanup task failed: {}", e),
        }
    }
}
