use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::directory::PropertyDirectory;
use super::domain::{ContractorId, LandlordId, QuoteBid, QuoteId, TenderDraft, TenderId};
use super::events::NotificationPublisher;
use super::service::{MarketplaceError, MarketplaceService};
use super::store::MarketplaceStore;

/// Router builder exposing the marketplace HTTP surface. The expiry sweep is
/// deliberately not routed: it is cron/sweeper-triggered only.
pub fn marketplace_router<S, D, P>(service: Arc<MarketplaceService<S, D, P>>) -> Router
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/tenders", post(post_tender_handler::<S, D, P>))
        .route(
            "/api/v1/contractors/:contractor_id/tenders",
            get(open_tenders_handler::<S, D, P>),
        )
        .route(
            "/api/v1/tenders/:tender_id/quotes",
            post(submit_quote_handler::<S, D, P>).get(rank_quotes_handler::<S, D, P>),
        )
        .route(
            "/api/v1/tenders/:tender_id/accept",
            post(accept_quote_handler::<S, D, P>),
        )
        .route(
            "/api/v1/tenders/:tender_id/complete",
            post(complete_tender_handler::<S, D, P>),
        )
        .route(
            "/api/v1/tenders/:tender_id/cancel",
            post(cancel_tender_handler::<S, D, P>),
        )
        .route(
            "/api/v1/quotes/:quote_id/withdraw",
            post(withdraw_quote_handler::<S, D, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitQuoteRequest {
    pub(crate) contractor_id: String,
    pub(crate) bid: QuoteBid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcceptQuoteRequest {
    pub(crate) quote_id: String,
    pub(crate) landlord_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LandlordActionRequest {
    pub(crate) landlord_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawQuoteRequest {
    pub(crate) contractor_id: String,
}

pub(crate) async fn post_tender_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Json(draft): Json<TenderDraft>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    match service.post_tender(draft, Utc::now()) {
        Ok(tender) => (StatusCode::CREATED, Json(tender)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn open_tenders_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(contractor_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let contractor_id = ContractorId(contractor_id);
    match service.open_tenders_for_contractor(&contractor_id, Utc::now()) {
        Ok(tenders) => (StatusCode::OK, Json(tenders)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_quote_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(tender_id): Path<String>,
    Json(request): Json<SubmitQuoteRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let tender_id = TenderId(tender_id);
    let contractor_id = ContractorId(request.contractor_id);
    match service.submit_quote(&tender_id, &contractor_id, request.bid, Utc::now()) {
        Ok(quote) => (StatusCode::ACCEPTED, Json(quote)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn rank_quotes_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(tender_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let tender_id = TenderId(tender_id);
    match service.rank_quotes(&tender_id) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn accept_quote_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(tender_id): Path<String>,
    Json(request): Json<AcceptQuoteRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let tender_id = TenderId(tender_id);
    let quote_id = QuoteId(request.quote_id);
    let landlord_id = LandlordId(request.landlord_id);
    match service.accept_quote(&tender_id, &quote_id, &landlord_id) {
        Ok(outcome) => {
            let payload = json!({
                "tender_id": outcome.tender.id,
                "tender_status": outcome.tender.status.label(),
                "accepted_quote_id": outcome.accepted.id,
                "rejected_quote_ids": outcome
                    .rejected
                    .iter()
                    .map(|quote| quote.id.clone())
                    .collect::<Vec<_>>(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn complete_tender_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(tender_id): Path<String>,
    Json(request): Json<LandlordActionRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let tender_id = TenderId(tender_id);
    let landlord_id = LandlordId(request.landlord_id);
    match service.complete_tender(&tender_id, &landlord_id) {
        Ok(tender) => (StatusCode::OK, Json(tender)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn cancel_tender_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(tender_id): Path<String>,
    Json(request): Json<LandlordActionRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let tender_id = TenderId(tender_id);
    let landlord_id = LandlordId(request.landlord_id);
    match service.cancel_tender(&tender_id, &landlord_id) {
        Ok(tender) => (StatusCode::OK, Json(tender)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn withdraw_quote_handler<S, D, P>(
    State(service): State<Arc<MarketplaceService<S, D, P>>>,
    Path(quote_id): Path<String>,
    Json(request): Json<WithdrawQuoteRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    D: PropertyDirectory + 'static,
    P: NotificationPublisher + 'static,
{
    let quote_id = QuoteId(quote_id);
    let contractor_id = ContractorId(request.contractor_id);
    match service.withdraw_quote(&quote_id, &contractor_id) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = match &self {
            MarketplaceError::TenderNotFound | MarketplaceError::QuoteNotFound => {
                StatusCode::NOT_FOUND
            }
            MarketplaceError::TenderClosed
            | MarketplaceError::DeadlinePassed
            | MarketplaceError::DuplicateQuote
            | MarketplaceError::InvalidState => StatusCode::CONFLICT,
            MarketplaceError::TradeMismatch { .. } | MarketplaceError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            MarketplaceError::NotAuthorized => StatusCode::FORBIDDEN,
            MarketplaceError::Directory(_) | MarketplaceError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(payload)).into_response()
    }
}
