use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tender_market::marketplace::{
    MarketplaceService, MarketplaceStore, NotificationPublisher, PropertyDirectory,
};
use tracing::{info, warn};

/// Periodic expiry sweep. Each tick is one idempotent conditional transaction
/// against the store, so overlapping with in-flight acceptances is safe:
/// whichever commits first wins and the other observes stale state.
pub(crate) async fn run<S, D, P>(
    service: Arc<MarketplaceService<S, D, P>>,
    interval: Duration,
) where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match service.sweep_expired_tenders(Utc::now()) {
            Ok(expired) if !expired.is_empty() => {
                info!(count = expired.len(), "closed expired tenders");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "expiry sweep failed; will retry next tick"),
        }
    }
}
