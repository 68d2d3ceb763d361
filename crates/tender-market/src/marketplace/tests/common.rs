use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::marketplace::directory::StaticDirectory;
use crate::marketplace::domain::{
    BudgetRange, ContractorId, LandlordId, Priority, PropertyId, Quote, QuoteBid, QuoteId, Tender,
    TenderDraft, TenderId,
};
use crate::marketplace::events::{Notification, NotificationPublisher, PublishError};
use crate::marketplace::memory::InMemoryMarketplaceStore;
use crate::marketplace::service::MarketplaceService;
use crate::marketplace::store::{AcceptanceOutcome, MarketplaceStore, StoreError};
use crate::marketplace::trades::TradeCategory;

pub(super) fn landlord() -> LandlordId {
    LandlordId("landlord-1".to_string())
}

pub(super) fn other_landlord() -> LandlordId {
    LandlordId("landlord-2".to_string())
}

pub(super) fn property() -> PropertyId {
    PropertyId("property-1".to_string())
}

pub(super) fn plumber() -> ContractorId {
    ContractorId("contractor-plumb".to_string())
}

pub(super) fn second_plumber() -> ContractorId {
    ContractorId("contractor-plumb-2".to_string())
}

pub(super) fn electrician() -> ContractorId {
    ContractorId("contractor-elec".to_string())
}

/// Fixed reference timeline so deadline arithmetic stays readable: `day(n)`
/// is noon UTC on the nth of June 2025.
pub(super) fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, n, 12, 0, 0)
        .single()
        .expect("valid fixture date")
}

pub(super) fn plumbing_draft(deadline: DateTime<Utc>) -> TenderDraft {
    TenderDraft {
        property_id: property(),
        landlord_id: landlord(),
        trade: TradeCategory::Plumbing,
        title: "Leaking kitchen tap".to_string(),
        description: "Steady drip under the sink, cabinet base swelling".to_string(),
        priority: Priority::High,
        budget: BudgetRange { min: 50, max: 150 },
        deadline,
    }
}

pub(super) fn bid(amount: u32) -> QuoteBid {
    QuoteBid {
        amount,
        description: "Replace tap and check isolation valve".to_string(),
        estimated_hours: Some(2),
        materials_included: true,
        materials_cost: Some(25),
        available_from: day(2).date_naive(),
        warranty_days: 90,
    }
}

pub(super) fn build_service() -> (
    MarketplaceService<InMemoryMarketplaceStore, StaticDirectory, RecordingPublisher>,
    Arc<InMemoryMarketplaceStore>,
    Arc<StaticDirectory>,
    Arc<RecordingPublisher>,
) {
    let store = Arc::new(InMemoryMarketplaceStore::default());
    let directory = Arc::new(seeded_directory());
    let notifications = Arc::new(RecordingPublisher::default());
    let service =
        MarketplaceService::new(store.clone(), directory.clone(), notifications.clone());
    (service, store, directory, notifications)
}

pub(super) fn seeded_directory() -> StaticDirectory {
    let directory = StaticDirectory::new();
    directory.register_property(property(), landlord());
    directory.register_contractor(plumber(), [TradeCategory::Plumbing]);
    directory.register_contractor(
        second_plumber(),
        [TradeCategory::Plumbing, TradeCategory::General],
    );
    directory.register_contractor(electrician(), [TradeCategory::Electrical]);
    directory
}

pub(super) fn post_plumbing_tender(
    service: &MarketplaceService<InMemoryMarketplaceStore, StaticDirectory, RecordingPublisher>,
    deadline: DateTime<Utc>,
) -> Tender {
    service
        .post_tender(plumbing_draft(deadline), day(1))
        .expect("tender posts")
}

pub(super) fn future_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(5)
}

#[derive(Default, Clone)]
pub(super) struct RecordingPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingPublisher {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingPublisher;

impl NotificationPublisher for FailingPublisher {
    fn publish(&self, _notification: Notification) -> Result<(), PublishError> {
        Err(PublishError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl MarketplaceStore for UnavailableStore {
    fn insert_tender(&self, _tender: Tender) -> Result<Tender, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn tender(&self, _id: &TenderId) -> Result<Option<Tender>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn quote(&self, _id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn open_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn quotes_for_tender(&self, _tender_id: &TenderId) -> Result<Vec<Quote>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn append_quote(&self, _quote: Quote) -> Result<Quote, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn commit_acceptance(
        &self,
        _tender_id: &TenderId,
        _quote_id: &QuoteId,
    ) -> Result<AcceptanceOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn withdraw_quote(&self, _quote_id: &QuoteId) -> Result<Quote, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn complete_tender(&self, _tender_id: &TenderId) -> Result<Tender, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn cancel_tender(&self, _tender_id: &TenderId) -> Result<Tender, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn expire_due_tenders(&self, _now: DateTime<Utc>) -> Result<Vec<Tender>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
