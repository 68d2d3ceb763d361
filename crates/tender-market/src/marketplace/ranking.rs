use super::domain::{Quote, QuoteReviewView, Tender};

/// Order quotes for landlord review: accepted first, then pending by
/// submission time (first come among equals), then rejected, then withdrawn.
pub fn review_order(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| {
        a.status
            .review_rank()
            .cmp(&b.status.review_rank())
            .then_with(|| a.submitted_at.cmp(&b.submitted_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    quotes
}

/// Ranked read-side views with the advisory budget flag resolved against the
/// tender's window.
pub fn review_views(tender: &Tender, quotes: Vec<Quote>) -> Vec<QuoteReviewView> {
    review_order(quotes)
        .into_iter()
        .map(|quote| QuoteReviewView::from_quote(tender, quote))
        .collect()
}
