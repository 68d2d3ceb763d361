use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::trades::TradeCategory;

/// Identifier wrapper for posted tenders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenderId(pub String);

/// Identifier wrapper for submitted quotes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

/// Reference to a property owned by the external property service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Reference to a landlord account owned by the external identity service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LandlordId(pub String);

/// Reference to a contractor account owned by the external identity service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractorId(pub String);

/// Urgency communicated to contractors; no scheduling behavior hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Advisory budget window on a tender. Bids outside the window are accepted
/// and flagged at read time, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

impl BudgetRange {
    pub fn fit(&self, amount: u32) -> BudgetFit {
        if amount < self.min {
            BudgetFit::Under
        } else if amount > self.max {
            BudgetFit::Over
        } else {
            BudgetFit::Within
        }
    }
}

/// Read-time classification of a bid against the tender's budget window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetFit {
    Within,
    Over,
    Under,
}

impl BudgetFit {
    pub const fn label(self) -> &'static str {
        match self {
            BudgetFit::Within => "within_budget",
            BudgetFit::Over => "over_budget",
            BudgetFit::Under => "under_budget",
        }
    }
}

/// Tender lifecycle status. Transitions only move forward along the state
/// machine; terminal states never accept further quotes or acceptances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Open,
    Quoted,
    Assigned,
    Completed,
    Expired,
    Cancelled,
}

impl TenderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TenderStatus::Open => "open",
            TenderStatus::Quoted => "quoted",
            TenderStatus::Assigned => "assigned",
            TenderStatus::Completed => "completed",
            TenderStatus::Expired => "expired",
            TenderStatus::Cancelled => "cancelled",
        }
    }

    /// Open and quoted both accept bids; quoted exists only to surface bid
    /// count to readers.
    pub const fn accepts_quotes(self) -> bool {
        matches!(self, TenderStatus::Open | TenderStatus::Quoted)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TenderStatus::Completed | TenderStatus::Expired | TenderStatus::Cancelled
        )
    }
}

/// Quote lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl QuoteStatus {
    pub const fn label(self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Withdrawn => "withdrawn",
        }
    }

    /// Sort key for landlord review: winner first, then earliest pending
    /// bids, then the field that lost out.
    pub const fn review_rank(self) -> u8 {
        match self {
            QuoteStatus::Accepted => 0,
            QuoteStatus::Pending => 1,
            QuoteStatus::Rejected => 2,
            QuoteStatus::Withdrawn => 3,
        }
    }
}

/// A landlord-posted maintenance job open for contractor bidding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: TenderId,
    pub property_id: PropertyId,
    pub landlord_id: LandlordId,
    pub trade: TradeCategory,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub budget: BudgetRange,
    pub deadline: DateTime<Utc>,
    pub status: TenderStatus,
    pub created_at: DateTime<Utc>,
}

/// A contractor's bid against a tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub tender_id: TenderId,
    pub contractor_id: ContractorId,
    pub amount: u32,
    pub description: String,
    pub estimated_hours: Option<u32>,
    pub materials_included: bool,
    pub materials_cost: Option<u32>,
    pub available_from: NaiveDate,
    pub warranty_days: u32,
    pub status: QuoteStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Quote {
    /// Withdrawn quotes free up the one-bid-per-contractor slot; every other
    /// status counts as live.
    pub fn is_live(&self) -> bool {
        self.status != QuoteStatus::Withdrawn
    }
}

/// Inbound payload for posting a tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderDraft {
    pub property_id: PropertyId,
    pub landlord_id: LandlordId,
    pub trade: TradeCategory,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub budget: BudgetRange,
    pub deadline: DateTime<Utc>,
}

impl TenderDraft {
    /// Malformed drafts are rejected before any store access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.budget.min > self.budget.max {
            return Err(ValidationError::BudgetRangeInverted {
                min: self.budget.min,
                max: self.budget.max,
            });
        }
        Ok(())
    }
}

/// Inbound payload for submitting a quote against a tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBid {
    pub amount: u32,
    pub description: String,
    #[serde(default)]
    pub estimated_hours: Option<u32>,
    #[serde(default)]
    pub materials_included: bool,
    #[serde(default)]
    pub materials_cost: Option<u32>,
    pub available_from: NaiveDate,
    #[serde(default)]
    pub warranty_days: u32,
}

impl QuoteBid {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount == 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.materials_cost.is_some() && !self.materials_included {
            return Err(ValidationError::MaterialsCostWithoutMaterials);
        }
        Ok(())
    }
}

/// Malformed-input errors raised before any store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tender title must not be empty")]
    EmptyTitle,
    #[error("budget minimum {min} exceeds maximum {max}")]
    BudgetRangeInverted { min: u32, max: u32 },
    #[error("quote amount must be greater than zero")]
    NonPositiveAmount,
    #[error("materials cost supplied without the materials-included flag")]
    MaterialsCostWithoutMaterials,
}

/// Read-side view of a quote in the landlord's review list.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteReviewView {
    pub quote_id: QuoteId,
    pub contractor_id: ContractorId,
    pub amount: u32,
    pub status: &'static str,
    pub budget_fit: &'static str,
    pub description: String,
    pub estimated_hours: Option<u32>,
    pub materials_included: bool,
    pub materials_cost: Option<u32>,
    pub available_from: NaiveDate,
    pub warranty_days: u32,
    pub submitted_at: DateTime<Utc>,
}

impl QuoteReviewView {
    pub fn from_quote(tender: &Tender, quote: Quote) -> Self {
        let fit = tender.budget.fit(quote.amount);
        Self {
            quote_id: quote.id,
            contractor_id: quote.contractor_id,
            amount: quote.amount,
            status: quote.status.label(),
            budget_fit: fit.label(),
            description: quote.description,
            estimated_hours: quote.estimated_hours,
            materials_included: quote.materials_included,
            materials_cost: quote.materials_cost,
            available_from: quote.available_from,
            warranty_days: quote.warranty_days,
            submitted_at: quote.submitted_at,
        }
    }
}
