//! Payout endpoints used by the counter application.
//!
//! Handlers only translate: request bodies become engine calls, engine
//! results become the fixed status codes existing callers rely on.

use crate::application::engine::PayoutEngine;
use crate::domain::outcome::{CaptureOutcome, Verdict};
use crate::domain::ticket::{PayeeDetails, TicketNumber};
use crate::error::PayoutFailure;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Non-standard status for a ticket that did not win.
pub const NOT_A_WINNER: u16 = 444;
/// Non-standard status for a winning ticket that was already paid.
pub const ALREADY_PAID: u16 = 433;

/// Builds the payout router. It carries no administrative routes.
///
/// The counter application is served from another origin, so any origin may
/// call these endpoints.
pub fn payout_router(engine: Arc<PayoutEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/validate-ticket", post(validate_ticket))
        .route("/capture-pay-details", post(capture_pay_details))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
pub struct ValidateTicketRequest {
    #[serde(rename = "ticketNo", default, deserialize_with = "ticket_field")]
    pub ticket_no: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapturePayDetailsRequest {
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub phone_number: Option<String>,
    pub phone_network: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    /// JSON numbers keep their exact digits; strings are accepted too.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount_paid: Option<Decimal>,
    #[serde(rename = "method")]
    pub method: Option<String>,
    #[serde(rename = "ticket", default, deserialize_with = "ticket_field")]
    pub ticket: Option<String>,
}

impl CapturePayDetailsRequest {
    fn into_parts(self) -> Result<(TicketNumber, PayeeDetails), PayoutFailure> {
        let number = TicketNumber::parse(self.ticket.unwrap_or_default())?;
        let amount_paid = self
            .amount_paid
            .ok_or_else(|| PayoutFailure::MalformedInput("AmountPaid is required".to_string()))?;
        let method = self
            .method
            .ok_or_else(|| PayoutFailure::MalformedInput("method is required".to_string()))?;

        let details = PayeeDetails {
            surname: self.surname,
            first_name: self.first_name,
            phone_number: self.phone_number,
            phone_network: self.phone_network,
            id_type: self.id_type,
            id_number: self.id_number,
            amount_paid,
            method,
        };
        Ok((number, details))
    }
}

/// Ticket numbers arrive as JSON strings or bare numbers.
fn ticket_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "ticket number must be a string or number, got {other}"
        ))),
    }
}

/// Status code and fixed message for a business result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub message: &'static str,
}

fn custom_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<Verdict> for Reply {
    fn from(verdict: Verdict) -> Self {
        let (status, message) = match verdict {
            Verdict::Eligible => (StatusCode::OK, "Winning ticket not paid."),
            Verdict::NotFound => (StatusCode::NOT_FOUND, "Ticket does not exist."),
            Verdict::NotAWinner => (custom_status(NOT_A_WINNER), "Not a winning ticket."),
            Verdict::AlreadyPaid => (custom_status(ALREADY_PAID), "Paid winning ticket."),
        };
        Self { status, message }
    }
}

impl From<CaptureOutcome> for Reply {
    fn from(outcome: CaptureOutcome) -> Self {
        match outcome {
            CaptureOutcome::Captured => Self {
                status: StatusCode::OK,
                message: "Details captured successfully.",
            },
            CaptureOutcome::NotFound => Verdict::NotFound.into(),
            CaptureOutcome::NotAWinner => Verdict::NotAWinner.into(),
            CaptureOutcome::AlreadyPaid => Verdict::AlreadyPaid.into(),
            CaptureOutcome::ConflictAlreadyProcessed => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "An error occurred while updating ticket payment details.",
            },
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<JsonRejection> for PayoutFailure {
    fn from(rejection: JsonRejection) -> Self {
        PayoutFailure::MalformedInput(rejection.body_text())
    }
}

impl IntoResponse for PayoutFailure {
    fn into_response(self) -> Response {
        match self {
            PayoutFailure::MalformedInput(reason) => {
                (StatusCode::BAD_REQUEST, format!("Malformed request: {reason}")).into_response()
            }
            PayoutFailure::StorageUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your request. Please try again.",
            )
                .into_response(),
        }
    }
}

pub async fn validate_ticket(
    State(engine): State<Arc<PayoutEngine>>,
    payload: Result<Json<ValidateTicketRequest>, JsonRejection>,
) -> Result<Reply, PayoutFailure> {
    let Json(request) = payload?;
    let number = TicketNumber::parse(request.ticket_no.unwrap_or_default())?;
    let verdict = engine.validate(&number).await?;
    Ok(verdict.into())
}

pub async fn capture_pay_details(
    State(engine): State<Arc<PayoutEngine>>,
    payload: Result<Json<CapturePayDetailsRequest>, JsonRejection>,
) -> Result<Reply, PayoutFailure> {
    let Json(request) = payload?;
    let (number, details) = request.into_parts()?;
    let outcome = engine.capture_payment(&number, details).await?;
    Ok(outcome.into())
}

/// Liveness only; does not touch the ticket store.
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
