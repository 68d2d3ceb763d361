use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::domain::Tender;
use super::trades::TradeCategory;

/// Filter and order the bid board for one contractor: still accepting bids,
/// trade in the contractor's set, deadline not yet passed. Newest-created
/// first so fresh work surfaces on top, with the id as a stable tie-break.
pub fn eligible_tenders(
    mut tenders: Vec<Tender>,
    trades: &BTreeSet<TradeCategory>,
    now: DateTime<Utc>,
) -> Vec<Tender> {
    tenders.retain(|tender| {
        tender.status.accepts_quotes() && trades.contains(&tender.trade) && tender.deadline >= now
    });
    tenders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    tenders
}
