use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{Quote, QuoteId, QuoteStatus, Tender, TenderId, TenderStatus};
use super::store::{AcceptanceOutcome, MarketplaceStore, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    tenders: BTreeMap<TenderId, Tender>,
    quotes: BTreeMap<QuoteId, Quote>,
}

/// In-memory [`MarketplaceStore`] backed by one mutex.
///
/// Holding the lock for the whole of each trait call serializes every
/// conditional transaction: competing acceptances for one tender run one
/// after the other, and the second observes the assigned status as a stale
/// precondition.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMarketplaceStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryMarketplaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarketplaceStore for InMemoryMarketplaceStore {
    fn insert_tender(&self, tender: Tender) -> Result<Tender, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.tenders.contains_key(&tender.id) {
            return Err(StoreError::Conflict);
        }
        state.tenders.insert(tender.id.clone(), tender.clone());
        Ok(tender)
    }

    fn tender(&self, id: &TenderId) -> Result<Option<Tender>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.tenders.get(id).cloned())
    }

    fn quote(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.quotes.get(id).cloned())
    }

    fn open_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .tenders
            .values()
            .filter(|tender| tender.status.accepts_quotes())
            .cloned()
            .collect())
    }

    fn quotes_for_tender(&self, tender_id: &TenderId) -> Result<Vec<Quote>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .quotes
            .values()
            .filter(|quote| quote.tender_id == *tender_id)
            .cloned()
            .collect())
    }

    fn append_quote(&self, quote: Quote) -> Result<Quote, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");

        let tender_status = match state.tenders.get(&quote.tender_id) {
            Some(tender) => tender.status,
            None => return Err(StoreError::TenderNotFound),
        };
        if !tender_status.accepts_quotes() {
            return Err(StoreError::StalePrecondition);
        }
        if state.quotes.contains_key(&quote.id) {
            return Err(StoreError::Conflict);
        }
        let duplicate = state
            .quotes
            .values()
            .any(|existing| {
                existing.tender_id == quote.tender_id
                    && existing.contractor_id == quote.contractor_id
                    && existing.is_live()
            });
        if duplicate {
            return Err(StoreError::DuplicateQuote);
        }

        state.quotes.insert(quote.id.clone(), quote.clone());
        if tender_status == TenderStatus::Open {
            if let Some(tender) = state.tenders.get_mut(&quote.tender_id) {
                tender.status = TenderStatus::Quoted;
            }
        }
        Ok(quote)
    }

    fn commit_acceptance(
        &self,
        tender_id: &TenderId,
        quote_id: &QuoteId,
    ) -> Result<AcceptanceOutcome, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");

        match state.tenders.get(tender_id) {
            Some(tender) if tender.status.accepts_quotes() => {}
            Some(_) => return Err(StoreError::StalePrecondition),
            None => return Err(StoreError::TenderNotFound),
        }
        match state.quotes.get(quote_id) {
            Some(quote)
                if quote.tender_id == *tender_id && quote.status == QuoteStatus::Pending => {}
            Some(_) => return Err(StoreError::StalePrecondition),
            None => return Err(StoreError::QuoteNotFound),
        }

        let mut accepted = None;
        let mut rejected = Vec::new();
        for quote in state
            .quotes
            .values_mut()
            .filter(|quote| quote.tender_id == *tender_id)
        {
            if quote.id == *quote_id {
                quote.status = QuoteStatus::Accepted;
                accepted = Some(quote.clone());
            } else if quote.status == QuoteStatus::Pending {
                quote.status = QuoteStatus::Rejected;
                rejected.push(quote.clone());
            }
        }
        let accepted = accepted.ok_or(StoreError::QuoteNotFound)?;

        let tender = match state.tenders.get_mut(tender_id) {
            Some(tender) => {
                tender.status = TenderStatus::Assigned;
                tender.clone()
            }
            None => return Err(StoreError::TenderNotFound),
        };

        Ok(AcceptanceOutcome {
            tender,
            accepted,
            rejected,
        })
    }

    fn withdraw_quote(&self, quote_id: &QuoteId) -> Result<Quote, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state.quotes.get_mut(quote_id) {
            Some(quote) if quote.status == QuoteStatus::Pending => {
                quote.status = QuoteStatus::Withdrawn;
                Ok(quote.clone())
            }
            Some(_) => Err(StoreError::StalePrecondition),
            None => Err(StoreError::QuoteNotFound),
        }
    }

    fn complete_tender(&self, tender_id: &TenderId) -> Result<Tender, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state.tenders.get_mut(tender_id) {
            Some(tender) if tender.status == TenderStatus::Assigned => {
                tender.status = TenderStatus::Completed;
                Ok(tender.clone())
            }
            Some(_) => Err(StoreError::StalePrecondition),
            None => Err(StoreError::TenderNotFound),
        }
    }

    fn cancel_tender(&self, tender_id: &TenderId) -> Result<Tender, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state.tenders.get_mut(tender_id) {
            Some(tender) if tender.status.accepts_quotes() => {
                tender.status = TenderStatus::Cancelled;
                Ok(tender.clone())
            }
            Some(_) => Err(StoreError::StalePrecondition),
            None => Err(StoreError::TenderNotFound),
        }
    }

    fn expire_due_tenders(&self, now: DateTime<Utc>) -> Result<Vec<Tender>, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let mut expired = Vec::new();
        for tender in state.tenders.values_mut() {
            if tender.status.accepts_quotes() && tender.deadline < now {
                tender.status = TenderStatus::Expired;
                expired.push(tender.clone());
            }
        }
        Ok(expired)
    }
}
