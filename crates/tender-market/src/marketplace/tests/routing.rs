use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::marketplace::directory::StaticDirectory;
use crate::marketplace::memory::InMemoryMarketplaceStore;
use crate::marketplace::router::marketplace_router;
use crate::marketplace::service::MarketplaceService;

fn build_router() -> (
    axum::Router,
    Arc<MarketplaceService<InMemoryMarketplaceStore, StaticDirectory, RecordingPublisher>>,
) {
    let (service, _, _, _) = build_service();
    let service = Arc::new(service);
    (marketplace_router(service.clone()), service)
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn draft_payload() -> Value {
    serde_json::to_value(plumbing_draft(future_deadline())).expect("serialize draft")
}

fn quote_payload(contractor: &str, amount: u32) -> Value {
    json!({
        "contractor_id": contractor,
        "bid": serde_json::to_value(bid(amount)).expect("serialize bid"),
    })
}

#[tokio::test]
async fn post_tender_returns_created_resource() {
    let (router, _) = build_router();

    let response = router
        .oneshot(post_json("/api/v1/tenders", &draft_payload()))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("open")));
    assert!(payload.get("id").is_some());
}

#[tokio::test]
async fn submit_quote_is_accepted_and_duplicates_conflict() {
    let (router, service) = build_router();
    let tender = service
        .post_tender(plumbing_draft(future_deadline()), day(1))
        .expect("tender posts");
    let uri = format!("/api/v1/tenders/{}/quotes", tender.id.0);

    let response = router
        .clone()
        .oneshot(post_json(&uri, &quote_payload("contractor-plumb", 65)))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("pending")));

    let duplicate = router
        .clone()
        .oneshot(post_json(&uri, &quote_payload("contractor-plumb", 70)))
        .await
        .expect("router dispatch");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let payload = read_json_body(duplicate).await;
    assert_eq!(payload.get("code"), Some(&json!("duplicate_quote")));
}

#[tokio::test]
async fn trade_mismatch_is_unprocessable_with_its_own_code() {
    let (router, service) = build_router();
    let tender = service
        .post_tender(plumbing_draft(future_deadline()), day(1))
        .expect("tender posts");

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/tenders/{}/quotes", tender.id.0),
            &quote_payload("contractor-elec", 65),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("code"), Some(&json!("trade_mismatch")));
}

#[tokio::test]
async fn acceptance_round_trip_over_http() {
    let (router, service) = build_router();
    let tender = service
        .post_tender(plumbing_draft(future_deadline()), day(1))
        .expect("tender posts");
    let winner = service
        .submit_quote(&tender.id, &plumber(), bid(65), day(1))
        .expect("winning quote");
    let loser = service
        .submit_quote(&tender.id, &second_plumber(), bid(120), day(2))
        .expect("losing quote");

    let accept_uri = format!("/api/v1/tenders/{}/accept", tender.id.0);
    let accept_payload = json!({
        "quote_id": winner.id.0,
        "landlord_id": "landlord-1",
    });

    let response = router
        .clone()
        .oneshot(post_json(&accept_uri, &accept_payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("tender_status"), Some(&json!("assigned")));
    assert_eq!(
        payload.get("rejected_quote_ids"),
        Some(&json!([loser.id.0.clone()]))
    );

    let retry = router
        .clone()
        .oneshot(post_json(
            &accept_uri,
            &json!({ "quote_id": loser.id.0, "landlord_id": "landlord-1" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(retry.status(), StatusCode::CONFLICT);
    let payload = read_json_body(retry).await;
    assert_eq!(payload.get("code"), Some(&json!("invalid_state")));

    let ranked = router
        .clone()
        .oneshot(get(&format!("/api/v1/tenders/{}/quotes", tender.id.0)))
        .await
        .expect("router dispatch");
    assert_eq!(ranked.status(), StatusCode::OK);
    let payload = read_json_body(ranked).await;
    let statuses: Vec<_> = payload
        .as_array()
        .expect("array body")
        .iter()
        .map(|view| view.get("status").and_then(Value::as_str).unwrap_or(""))
        .collect();
    assert_eq!(statuses, vec!["accepted", "rejected"]);
}

#[tokio::test]
async fn foreign_landlord_acceptance_is_forbidden() {
    let (router, service) = build_router();
    let tender = service
        .post_tender(plumbing_draft(future_deadline()), day(1))
        .expect("tender posts");
    let quote = service
        .submit_quote(&tender.id, &plumber(), bid(65), day(1))
        .expect("quote");

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/tenders/{}/accept", tender.id.0),
            &json!({ "quote_id": quote.id.0, "landlord_id": "landlord-2" }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("code"), Some(&json!("not_authorized")));
}

#[tokio::test]
async fn unknown_tender_is_not_found() {
    let (router, _) = build_router();

    let response = router
        .oneshot(get("/api/v1/tenders/tender-missing/quotes"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("code"), Some(&json!("tender_not_found")));
}

#[tokio::test]
async fn contractor_board_lists_matching_open_tenders() {
    let (router, service) = build_router();
    service
        .post_tender(plumbing_draft(future_deadline()), day(1))
        .expect("tender posts");

    let response = router
        .clone()
        .oneshot(get("/api/v1/contractors/contractor-plumb/tenders"))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));

    let empty = router
        .clone()
        .oneshot(get("/api/v1/contractors/contractor-elec/tenders"))
        .await
        .expect("router dispatch");
    let payload = read_json_body(empty).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn store_outage_maps_to_internal_error() {
    let service = Arc::new(MarketplaceService::new(
        Arc::new(UnavailableStore),
        Arc::new(seeded_directory()),
        Arc::new(RecordingPublisher::default()),
    ));
    let router = marketplace_router(service);

    let response = router
        .oneshot(post_json("/api/v1/tenders", &draft_payload()))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("code"), Some(&json!("store_unavailable")));
}
