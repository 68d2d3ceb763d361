//! Tender and quote marketplace engine.
//!
//! Landlords post maintenance tenders, contractors with a matching trade bid
//! on them, and exactly one quote per tender can ever be accepted. All state
//! transitions are conditional transactions owned by the store; the service
//! facade only requests transitions and reacts to the authoritative result.

pub mod directory;
pub mod domain;
pub mod events;
pub mod matching;
pub mod memory;
pub mod ranking;
pub mod router;
pub mod service;
pub mod store;
pub mod trades;

#[cfg(test)]
mod tests;

pub use directory::{DirectoryError, PropertyDirectory, StaticDirectory};
pub use domain::{
    BudgetFit, BudgetRange, ContractorId, LandlordId, Priority, PropertyId, Quote, QuoteBid,
    QuoteId, QuoteReviewView, QuoteStatus, Tender, TenderDraft, TenderId, TenderStatus,
    ValidationError,
};
pub use events::{Notification, NotificationKind, NotificationPublisher, PublishError};
pub use memory::InMemoryMarketplaceStore;
pub use router::marketplace_router;
pub use service::{MarketplaceError, MarketplaceService};
pub use store::{AcceptanceOutcome, MarketplaceStore, StoreError};
pub use trades::TradeCategory;
