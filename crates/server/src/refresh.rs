//! The background snapshot refresh loop.
//!
//! One supervised tokio task pulls the three clinical tables on a fixed
//! interval and publishes the bundle as the next snapshot generation. A
//! failed pull is logged and the previous snapshot stays current; the loop
//! retries on the next tick and only process shutdown stops it.

use std::sync::Arc;
use std::time::Duration;

use docmatch_core::SnapshotStore;
use docmatch_db::ClinicalDataSource;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Attempt one refresh. Returns the published generation on success; on
/// failure logs a warning and returns `None`, leaving the previous snapshot
/// current.
pub async fn refresh_once(
    source: &dyn ClinicalDataSource,
    store: &SnapshotStore,
) -> Option<u64> {
    match source.load_snapshot().await {
        Ok(snapshot) => {
            let doctor_count = snapshot.doctors.len();
            let rating_count = snapshot.ratings.len();
            let condition_count = snapshot.history.vocabulary().len();
            let generation = store.publish(snapshot);
            info!(
                event_name = "system.refresh.published",
                generation,
                doctor_count,
                rating_count,
                condition_count,
                "snapshot refreshed"
            );
            Some(generation)
        }
        Err(error) => {
            warn!(
                event_name = "system.refresh.failed",
                error = %error,
                current_generation = store.current().generation,
                "snapshot refresh failed; keeping previous snapshot"
            );
            None
        }
    }
}

/// Spawn the periodic refresh task. The first interval tick fires
/// immediately and is consumed up front because bootstrap already performed
/// the eager initial refresh.
pub fn spawn(
    source: Arc<dyn ClinicalDataSource>,
    store: Arc<SnapshotStore>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!(
            event_name = "system.refresh.loop_started",
            interval_secs,
            "snapshot refresh loop started"
        );

        loop {
            ticker.tick().await;
            refresh_once(source.as_ref(), &store).await;
        }
    })
}
