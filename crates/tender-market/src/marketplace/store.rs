use chrono::{DateTime, Utc};

use super::domain::{Quote, QuoteId, Tender, TenderId};

/// Result of a committed acceptance transaction: the reassigned tender, the
/// winning quote, and every sibling quote the commit rejected.
#[derive(Debug, Clone)]
pub struct AcceptanceOutcome {
    pub tender: Tender,
    pub accepted: Quote,
    pub rejected: Vec<Quote>,
}

/// Error enumeration for store failures.
///
/// `StalePrecondition` is what the loser of any race observes: the record
/// state a conditional transaction was predicated on no longer holds by the
/// time the transaction runs. It is authoritative and must not be retried.
/// `Unavailable` is infrastructure trouble; no partial state is ever left
/// visible, so the whole operation is safe to retry from scratch.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("tender not found")]
    TenderNotFound,
    #[error("quote not found")]
    QuoteNotFound,
    #[error("record already exists")]
    Conflict,
    #[error("contractor already has a live quote for this tender")]
    DuplicateQuote,
    #[error("record state changed since read; precondition no longer holds")]
    StalePrecondition,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence abstraction for tenders and quotes.
///
/// Every mutating method is one atomic conditional transaction: the
/// precondition is re-checked inside the store's critical section and the
/// method fails with [`StoreError::StalePrecondition`] when a competing
/// transaction committed first. The tender and its quotes are the unit of
/// contention; no method ever locks across tenders.
pub trait MarketplaceStore: Send + Sync {
    fn insert_tender(&self, tender: Tender) -> Result<Tender, StoreError>;

    fn tender(&self, id: &TenderId) -> Result<Option<Tender>, StoreError>;

    fn quote(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError>;

    /// All tenders still accepting bids, in unspecified order.
    fn open_tenders(&self) -> Result<Vec<Tender>, StoreError>;

    fn quotes_for_tender(&self, tender_id: &TenderId) -> Result<Vec<Quote>, StoreError>;

    /// Conditionally append a quote: the tender must exist and still accept
    /// bids, and the contractor must not already hold a live quote on it.
    /// Flips the tender open -> quoted in the same transaction (idempotent
    /// when already quoted).
    fn append_quote(&self, quote: Quote) -> Result<Quote, StoreError>;

    /// The single-winner transaction: requires the tender to accept bids and
    /// the quote to be pending and belong to it, then accepts the quote,
    /// rejects every other pending quote on the tender, and assigns the
    /// tender. Of racing calls for one tender exactly one commits.
    fn commit_acceptance(
        &self,
        tender_id: &TenderId,
        quote_id: &QuoteId,
    ) -> Result<AcceptanceOutcome, StoreError>;

    /// Conditionally move a pending quote to withdrawn.
    fn withdraw_quote(&self, quote_id: &QuoteId) -> Result<Quote, StoreError>;

    /// Conditionally move an assigned tender to completed.
    fn complete_tender(&self, tender_id: &TenderId) -> Result<Tender, StoreError>;

    /// Conditionally move a bid-accepting tender to cancelled.
    fn cancel_tender(&self, tender_id: &TenderId) -> Result<Tender, StoreError>;

    /// Expire every bid-accepting tender whose deadline has passed, returning
    /// the tenders this call transitioned. Quotes are left untouched.
    /// Idempotent: a second sweep over the same data changes nothing.
    fn expire_due_tenders(&self, now: DateTime<Utc>) -> Result<Vec<Tender>, StoreError>;
}
