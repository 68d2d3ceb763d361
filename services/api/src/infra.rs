use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tender_market::marketplace::{
    ContractorId, LandlordId, Notification, NotificationPublisher, PropertyId, PublishError,
    StaticDirectory, TradeCategory,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fire-and-forget notification transport for the in-process deployment:
/// deliveries are traced, never acknowledged. The real dispatcher sits behind
/// the same trait in the host application.
#[derive(Default, Clone)]
pub(crate) struct TracingNotificationPublisher;

impl NotificationPublisher for TracingNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        info!(
            kind = notification.kind.label(),
            tender_id = %notification.tender_id.0,
            recipient = %notification.recipient,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

/// Directory seeding used by the serve and demo commands until the external
/// identity/property provider is wired in.
pub(crate) fn seeded_directory() -> StaticDirectory {
    let directory = StaticDirectory::new();
    directory.register_property(
        PropertyId("property-elm-road-12".to_string()),
        LandlordId("landlord-ashworth".to_string()),
    );
    directory.register_property(
        PropertyId("property-kings-court-3".to_string()),
        LandlordId("landlord-ashworth".to_string()),
    );
    directory.register_contractor(
        ContractorId("contractor-hale-plumbing".to_string()),
        [TradeCategory::Plumbing, TradeCategory::Heating],
    );
    directory.register_contractor(
        ContractorId("contractor-drake-electrics".to_string()),
        [TradeCategory::Electrical],
    );
    directory.register_contractor(
        ContractorId("contractor-mills-maintenance".to_string()),
        [
            TradeCategory::General,
            TradeCategory::Carpentry,
            TradeCategory::Plumbing,
        ],
    );
    directory
}
