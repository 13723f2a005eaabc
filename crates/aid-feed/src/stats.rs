use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use aid_api::HelpRequestApi;

pub const COMPLETED_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll the community-wide completed-request counter until `shutdown`.
///
/// The receiver holds `None` until the first successful poll, so an unknown
/// count is never shown as zero. After that it changes only when the backend
/// reports a new value. Failed polls are logged and skipped.
pub fn watch_completed_count<A: HelpRequestApi>(
    api: Arc<A>,
    interval: Duration,
    shutdown: CancellationToken,
) -> watch::Receiver<Option<u64>> {
    let (tx, rx) = watch::channel(None);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = api.completed_requests_count() => result,
            };

            match result {
                Ok(count) => {
                    tx.send_if_modified(|current| {
                        let changed = *current != Some(count);
                        *current = Some(count);
                        changed
                    });
                }
                Err(e) => warn!("Failed to fetch completed request count: {}", e),
            }
        }
        debug!("Completed-count watcher stopped");
    });

    rx
}
