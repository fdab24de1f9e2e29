use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use ticket_payout::application::engine::PayoutEngine;
use ticket_payout::domain::ports::TicketStore;
use ticket_payout::domain::ticket::{PayeeDetails, Ticket, TicketNumber};
use ticket_payout::error::{PayoutError, Result};
use ticket_payout::interfaces::http::payout_router;
use tower::ServiceExt;

mod common;
use common::{engine_for, number, seeded_store};

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Every call fails with a cause that must stay out of responses.
struct BrokenStore;

#[async_trait]
impl TicketStore for BrokenStore {
    async fn find_by_number(&self, _number: &TicketNumber) -> Result<Option<Ticket>> {
        Err(PayoutError::InternalError("replica db-7 refused connection".to_string()))
    }

    async fn apply_payment(
        &self,
        _number: &TicketNumber,
        _details: &PayeeDetails,
    ) -> Result<u64> {
        Err(PayoutError::InternalError("replica db-7 refused connection".to_string()))
    }
}

/// Eligible on read, already consumed on write.
struct RaceLosingStore;

#[async_trait]
impl TicketStore for RaceLosingStore {
    async fn find_by_number(&self, number: &TicketNumber) -> Result<Option<Ticket>> {
        Ok(Some(Ticket::new(number.clone(), true)))
    }

    async fn apply_payment(
        &self,
        _number: &TicketNumber,
        _details: &PayeeDetails,
    ) -> Result<u64> {
        Ok(0)
    }
}

fn router_over(store: impl TicketStore + 'static) -> Router {
    payout_router(Arc::new(PayoutEngine::new(Arc::new(store))))
}

fn capture_body(ticket: &str, amount: &str) -> Value {
    json!({
        "Surname": "Mensah",
        "FirstName": "Ama",
        "PhoneNumber": "0240000000",
        "PhoneNetwork": "MTN",
        "IdType": "Voter ID",
        "IdNumber": "V-1",
        "AmountPaid": amount,
        "method": "cash",
        "ticket": ticket,
    })
}

#[tokio::test]
async fn test_validate_ticket_codes() {
    let store = seeded_store(&[("W", true, false), ("P", true, true), ("L", false, true)]).await;
    let app = payout_router(engine_for(&store));

    assert_eq!(
        post_json(&app, "/validate-ticket", json!({"ticketNo": "W"})).await,
        (StatusCode::OK, "Winning ticket not paid.".to_string())
    );
    assert_eq!(
        post_json(&app, "/validate-ticket", json!({"ticketNo": "missing"})).await,
        (StatusCode::NOT_FOUND, "Ticket does not exist.".to_string())
    );

    let (status, body) = post_json(&app, "/validate-ticket", json!({"ticketNo": "L"})).await;
    assert_eq!(status.as_u16(), 444);
    assert_eq!(body, "Not a winning ticket.");

    let (status, body) = post_json(&app, "/validate-ticket", json!({"ticketNo": "P"})).await;
    assert_eq!(status.as_u16(), 433);
    assert_eq!(body, "Paid winning ticket.");
}

#[tokio::test]
async fn test_capture_pay_details_flow() {
    let store = seeded_store(&[("T1", true, false)]).await;
    let app = payout_router(engine_for(&store));

    assert_eq!(
        post_json(&app, "/capture-pay-details", capture_body("T1", "50.00")).await,
        (StatusCode::OK, "Details captured successfully.".to_string())
    );

    let (status, body) = post_json(&app, "/capture-pay-details", capture_body("T1", "70.00")).await;
    assert_eq!(status.as_u16(), 433);
    assert_eq!(body, "Paid winning ticket.");

    let (status, _) = post_json(&app, "/validate-ticket", json!({"ticketNo": "T1"})).await;
    assert_eq!(status.as_u16(), 433);

    let ticket = store.find_by_number(&number("T1")).await.unwrap().unwrap();
    let payout = ticket.payout.unwrap();
    assert_eq!(payout.details.surname.as_deref(), Some("Mensah"));
    assert_eq!(payout.details.amount_paid.to_string(), "50.00");
}

#[tokio::test]
async fn test_numeric_amount_stored_exactly() {
    let store = seeded_store(&[("T1", true, false)]).await;
    let app = payout_router(engine_for(&store));

    let (status, _) = post_raw(
        &app,
        "/capture-pay-details",
        r#"{"AmountPaid":12345678.123456789,"method":"cash","ticket":"T1"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let ticket = store.find_by_number(&number("T1")).await.unwrap().unwrap();
    let amount = ticket.payout.unwrap().details.amount_paid;
    assert_eq!(amount, dec!(12345678.123456789));
    assert_eq!(amount.to_string(), "12345678.123456789");
}

#[tokio::test]
async fn test_storage_failure_is_generic_500() {
    let app = router_over(BrokenStore);
    let generic = "An error occurred while processing your request. Please try again.";

    let (status, body) = post_json(&app, "/validate-ticket", json!({"ticketNo": "T1"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    let (status, body) = post_json(&app, "/capture-pay-details", capture_body("T1", "5")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);
    assert!(!body.contains("db-7"));
}

#[tokio::test]
async fn test_lost_race_is_500() {
    let app = router_over(RaceLosingStore);

    assert_eq!(
        post_json(&app, "/capture-pay-details", capture_body("T1", "5")).await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An error occurred while updating ticket payment details.".to_string()
        )
    );
}

#[tokio::test]
async fn test_cross_origin_preflight() {
    let store = seeded_store(&[("T1", true, false)]).await;
    let app = payout_router(engine_for(&store));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/validate-ticket")
        .header(header::ORIGIN, "http://counter.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));

    let request = Request::builder()
        .method("POST")
        .uri("/validate-ticket")
        .header(header::ORIGIN, "http://counter.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"ticketNo": "T1"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_capture_rejections() {
    let store = seeded_store(&[("L", false, false)]).await;
    let app = payout_router(engine_for(&store));

    let (status, _) = post_json(&app, "/capture-pay-details", capture_body("L", "5")).await;
    assert_eq!(status.as_u16(), 444);

    let (status, _) = post_json(&app, "/capture-pay-details", capture_body("nope", "5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.find_by_number(&number("nope")).await.unwrap().is_none());

    let ticket = store.find_by_number(&number("L")).await.unwrap().unwrap();
    assert!(!ticket.paid);
}

#[tokio::test]
async fn test_malformed_requests() {
    let store = seeded_store(&[("T1", true, false)]).await;
    let app = payout_router(engine_for(&store));

    let (status, _) = post_json(&app, "/validate-ticket", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/validate-ticket", json!({"ticketNo": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_raw(&app, "/validate-ticket", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/capture-pay-details",
        json!({"ticket": "T1", "method": "cash"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/capture-pay-details",
        json!({"ticket": "T1", "AmountPaid": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ticket = store.find_by_number(&number("T1")).await.unwrap().unwrap();
    assert!(!ticket.paid);
}

#[tokio::test]
async fn test_numeric_ticket_number_accepted() {
    let store = seeded_store(&[("1234", true, false)]).await;
    let app = payout_router(engine_for(&store));

    let (status, _) = post_json(&app, "/validate-ticket", json!({"ticketNo": 1234})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_no_admin_route_on_payout_router() {
    let store = seeded_store(&[]).await;
    let app = payout_router(engine_for(&store));

    let (status, _) = post_raw(&app, "/add-columns", String::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let store = seeded_store(&[]).await;
    let app = payout_router(engine_for(&store));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
