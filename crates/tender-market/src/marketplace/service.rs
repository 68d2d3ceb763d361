use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::directory::{DirectoryError, PropertyDirectory};
use super::domain::{
    ContractorId, LandlordId, Quote, QuoteBid, QuoteId, QuoteReviewView, QuoteStatus, Tender,
    TenderDraft, TenderId, TenderStatus, ValidationError,
};
use super::events::{Notification, NotificationKind, NotificationPublisher};
use super::matching;
use super::ranking;
use super::store::{AcceptanceOutcome, MarketplaceStore, StoreError};
use super::trades::TradeCategory;

/// Service facade composing the store, the identity/property directory, and
/// the notification publisher. Stateless between calls: every durable fact
/// lives in the store, so any number of workers can run this concurrently.
pub struct MarketplaceService<S, D, P> {
    store: Arc<S>,
    directory: Arc<D>,
    notifier: Arc<P>,
}

static TENDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static QUOTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_tender_id() -> TenderId {
    let id = TENDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TenderId(format!("tender-{id:06}"))
}

fn next_quote_id() -> QuoteId {
    let id = QUOTE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QuoteId(format!("quote-{id:06}"))
}

impl<S, D, P> MarketplaceService<S, D, P>
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, notifier: Arc<P>) -> Self {
        Self {
            store,
            directory,
            notifier,
        }
    }

    /// Post a new tender on behalf of a landlord. The posting landlord must
    /// be the registered owner of the property.
    pub fn post_tender(
        &self,
        draft: TenderDraft,
        now: DateTime<Utc>,
    ) -> Result<Tender, MarketplaceError> {
        draft.validate()?;

        let owner = self
            .directory
            .landlord_for_property(&draft.property_id)?
            .ok_or(MarketplaceError::NotAuthorized)?;
        if owner != draft.landlord_id {
            return Err(MarketplaceError::NotAuthorized);
        }

        let tender = Tender {
            id: next_tender_id(),
            property_id: draft.property_id,
            landlord_id: draft.landlord_id,
            trade: draft.trade,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            budget: draft.budget,
            deadline: draft.deadline,
            status: TenderStatus::Open,
            created_at: now,
        };

        self.store
            .insert_tender(tender)
            .map_err(MarketplaceError::from_store)
    }

    /// Submit a quote against a tender. All preconditions are terminal
    /// rejections; nothing here is retried.
    pub fn submit_quote(
        &self,
        tender_id: &TenderId,
        contractor_id: &ContractorId,
        bid: QuoteBid,
        now: DateTime<Utc>,
    ) -> Result<Quote, MarketplaceError> {
        bid.validate()?;

        let tender = self
            .store
            .tender(tender_id)
            .map_err(MarketplaceError::from_store)?
            .ok_or(MarketplaceError::TenderNotFound)?;
        if !tender.status.accepts_quotes() {
            return Err(MarketplaceError::TenderClosed);
        }
        if now >= tender.deadline {
            return Err(MarketplaceError::DeadlinePassed);
        }

        let trades = self.directory.trades_for_contractor(contractor_id)?;
        if !trades.contains(&tender.trade) {
            return Err(MarketplaceError::TradeMismatch {
                required: tender.trade,
            });
        }

        let quote = Quote {
            id: next_quote_id(),
            tender_id: tender_id.clone(),
            contractor_id: contractor_id.clone(),
            amount: bid.amount,
            description: bid.description,
            estimated_hours: bid.estimated_hours,
            materials_included: bid.materials_included,
            materials_cost: bid.materials_cost,
            available_from: bid.available_from,
            warranty_days: bid.warranty_days,
            status: QuoteStatus::Pending,
            submitted_at: now,
        };

        // The store re-checks the tender status and the one-live-quote rule
        // inside its own transaction; the reads above only shape the error.
        let stored = self.store.append_quote(quote).map_err(|err| match err {
            StoreError::StalePrecondition => MarketplaceError::TenderClosed,
            other => MarketplaceError::from_store(other),
        })?;

        self.notify(Notification {
            kind: NotificationKind::QuoteReceived,
            tender_id: tender_id.clone(),
            quote_id: Some(stored.id.clone()),
            recipient: tender.landlord_id.0.clone(),
            details: quote_details(&tender, &stored),
        });

        Ok(stored)
    }

    /// The bid board for one contractor: open tenders in their trades whose
    /// deadline has not passed, newest first. Pure read.
    pub fn open_tenders_for_contractor(
        &self,
        contractor_id: &ContractorId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Tender>, MarketplaceError> {
        let trades = self.directory.trades_for_contractor(contractor_id)?;
        let tenders = self
            .store
            .open_tenders()
            .map_err(MarketplaceError::from_store)?;
        Ok(matching::eligible_tenders(tenders, &trades, now))
    }

    /// Accept one quote as the winner for a tender. Exactly one concurrent
    /// call per tender can ever succeed; losers observe `InvalidState`.
    pub fn accept_quote(
        &self,
        tender_id: &TenderId,
        quote_id: &QuoteId,
        acting_landlord: &LandlordId,
    ) -> Result<AcceptanceOutcome, MarketplaceError> {
        let tender = self
            .store
            .tender(tender_id)
            .map_err(MarketplaceError::from_store)?
            .ok_or(MarketplaceError::TenderNotFound)?;

        let owner = self
            .directory
            .landlord_for_property(&tender.property_id)?
            .ok_or(MarketplaceError::NotAuthorized)?;
        if owner != *acting_landlord {
            return Err(MarketplaceError::NotAuthorized);
        }

        let outcome = self
            .store
            .commit_acceptance(tender_id, quote_id)
            .map_err(|err| match err {
                StoreError::StalePrecondition | StoreError::QuoteNotFound => {
                    MarketplaceError::InvalidState
                }
                other => MarketplaceError::from_store(other),
            })?;

        self.notify(Notification {
            kind: NotificationKind::QuoteAccepted,
            tender_id: tender_id.clone(),
            quote_id: Some(outcome.accepted.id.clone()),
            recipient: outcome.accepted.contractor_id.0.clone(),
            details: quote_details(&outcome.tender, &outcome.accepted),
        });
        for loser in &outcome.rejected {
            self.notify(Notification {
                kind: NotificationKind::QuoteRejected,
                tender_id: tender_id.clone(),
                quote_id: Some(loser.id.clone()),
                recipient: loser.contractor_id.0.clone(),
                details: quote_details(&outcome.tender, loser),
            });
        }

        Ok(outcome)
    }

    /// Ranked quote list for landlord review.
    pub fn rank_quotes(
        &self,
        tender_id: &TenderId,
    ) -> Result<Vec<QuoteReviewView>, MarketplaceError> {
        let tender = self
            .store
            .tender(tender_id)
            .map_err(MarketplaceError::from_store)?
            .ok_or(MarketplaceError::TenderNotFound)?;
        let quotes = self
            .store
            .quotes_for_tender(tender_id)
            .map_err(MarketplaceError::from_store)?;
        Ok(ranking::review_views(&tender, quotes))
    }

    /// Withdraw a pending quote. Only the contractor who submitted it may do
    /// so; the contractor id on a quote never changes, so the ownership read
    /// cannot go stale against the conditional transition.
    pub fn withdraw_quote(
        &self,
        quote_id: &QuoteId,
        contractor_id: &ContractorId,
    ) -> Result<Quote, MarketplaceError> {
        let quote = self
            .store
            .quote(quote_id)
            .map_err(MarketplaceError::from_store)?
            .ok_or(MarketplaceError::QuoteNotFound)?;
        if quote.contractor_id != *contractor_id {
            return Err(MarketplaceError::NotAuthorized);
        }

        self.store.withdraw_quote(quote_id).map_err(|err| match err {
            StoreError::StalePrecondition => MarketplaceError::InvalidState,
            other => MarketplaceError::from_store(other),
        })
    }

    /// Mark the assigned work as done (external trigger from the host
    /// application once the job is finished on site).
    pub fn complete_tender(
        &self,
        tender_id: &TenderId,
        acting_landlord: &LandlordId,
    ) -> Result<Tender, MarketplaceError> {
        self.authorize_landlord(tender_id, acting_landlord)?;
        self.store.complete_tender(tender_id).map_err(|err| match err {
            StoreError::StalePrecondition => MarketplaceError::InvalidState,
            other => MarketplaceError::from_store(other),
        })
    }

    /// Landlord cancellation of a tender still accepting bids. A status
    /// change, never a deletion: the record stays for audit history.
    pub fn cancel_tender(
        &self,
        tender_id: &TenderId,
        acting_landlord: &LandlordId,
    ) -> Result<Tender, MarketplaceError> {
        self.authorize_landlord(tender_id, acting_landlord)?;
        self.store.cancel_tender(tender_id).map_err(|err| match err {
            StoreError::StalePrecondition => MarketplaceError::InvalidState,
            other => MarketplaceError::from_store(other),
        })
    }

    /// Close every tender whose bidding deadline passed without an
    /// acceptance. Idempotent; cron/sweeper-triggered only.
    pub fn sweep_expired_tenders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Tender>, MarketplaceError> {
        let expired = self
            .store
            .expire_due_tenders(now)
            .map_err(MarketplaceError::from_store)?;

        for tender in &expired {
            let mut details = BTreeMap::new();
            details.insert("title".to_string(), tender.title.clone());
            details.insert("deadline".to_string(), tender.deadline.to_rfc3339());
            self.notify(Notification {
                kind: NotificationKind::TenderExpired,
                tender_id: tender.id.clone(),
                quote_id: None,
                recipient: tender.landlord_id.0.clone(),
                details,
            });
        }

        Ok(expired)
    }

    fn authorize_landlord(
        &self,
        tender_id: &TenderId,
        acting_landlord: &LandlordId,
    ) -> Result<Tender, MarketplaceError> {
        let tender = self
            .store
            .tender(tender_id)
            .map_err(MarketplaceError::from_store)?
            .ok_or(MarketplaceError::TenderNotFound)?;
        let owner = self
            .directory
            .landlord_for_property(&tender.property_id)?
            .ok_or(MarketplaceError::NotAuthorized)?;
        if owner != *acting_landlord {
            return Err(MarketplaceError::NotAuthorized);
        }
        Ok(tender)
    }

    /// Delivery is advisory: state correctness is authoritative, so publish
    /// failures are logged and suppressed, never rolled back or propagated.
    fn notify(&self, notification: Notification) {
        let kind = notification.kind;
        let tender_id = notification.tender_id.clone();
        if let Err(err) = self.notifier.publish(notification) {
            warn!(
                kind = kind.label(),
                tender_id = %tender_id.0,
                error = %err,
                "notification delivery failed; state transition stands"
            );
        }
    }
}

fn quote_details(tender: &Tender, quote: &Quote) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    details.insert("tender_title".to_string(), tender.title.clone());
    details.insert("amount".to_string(), quote.amount.to_string());
    details.insert(
        "budget_fit".to_string(),
        tender.budget.fit(quote.amount).label().to_string(),
    );
    details
}

/// Error raised by the marketplace service. Every precondition outcome keeps
/// its own variant so callers can tell "someone already accepted this job"
/// apart from "duplicate bid" or "wrong trade".
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("tender not found")]
    TenderNotFound,
    #[error("quote not found")]
    QuoteNotFound,
    #[error("tender is no longer accepting quotes")]
    TenderClosed,
    #[error("submission deadline has passed")]
    DeadlinePassed,
    #[error("contractor is not qualified for {required} work")]
    TradeMismatch { required: TradeCategory },
    #[error("contractor already has a live quote for this tender")]
    DuplicateQuote,
    #[error("tender or quote state changed; the operation no longer applies")]
    InvalidState,
    #[error("acting party is not authorized for this tender")]
    NotAuthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl MarketplaceError {
    /// Stable machine-readable code surfaced in API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceError::TenderNotFound => "tender_not_found",
            MarketplaceError::QuoteNotFound => "quote_not_found",
            MarketplaceError::TenderClosed => "tender_closed",
            MarketplaceError::DeadlinePassed => "deadline_passed",
            MarketplaceError::TradeMismatch { .. } => "trade_mismatch",
            MarketplaceError::DuplicateQuote => "duplicate_quote",
            MarketplaceError::InvalidState => "invalid_state",
            MarketplaceError::NotAuthorized => "not_authorized",
            MarketplaceError::Validation(_) => "validation_failed",
            MarketplaceError::Directory(_) => "directory_unavailable",
            MarketplaceError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::TenderNotFound => MarketplaceError::TenderNotFound,
            StoreError::QuoteNotFound => MarketplaceError::QuoteNotFound,
            StoreError::DuplicateQuote => MarketplaceError::DuplicateQuote,
            StoreError::Conflict | StoreError::StalePrecondition => MarketplaceError::InvalidState,
            StoreError::Unavailable(detail) => MarketplaceError::StoreUnavailable(detail),
        }
    }
}
