//! Administrative endpoints.
//!
//! Served on their own listener and only when a token is configured. Every
//! request must carry `Authorization: Bearer <token>`.

use crate::domain::ports::{SchemaAdminRef, SchemaChange};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AdminState {
    admin: SchemaAdminRef,
    token: Arc<str>,
}

pub fn admin_router(admin: SchemaAdminRef, token: impl Into<String>) -> Router {
    let state = AdminState {
        admin,
        token: Arc::from(token.into()),
    };

    Router::new()
        .route("/add-columns", post(add_columns))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Compares in constant time so response latency does not reveal how much
/// of the token matched.
fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|token| {
        constant_time_eq::constant_time_eq(token.as_bytes(), expected.as_bytes())
    })
}

pub async fn add_columns(
    State(state): State<AdminState>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    if !token_matches(bearer_token(&headers), &state.token) {
        tracing::warn!("rejected admin request with missing or invalid token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized.");
    }

    match state.admin.add_payee_columns().await {
        Ok(SchemaChange::Applied) => (StatusCode::OK, "New columns added to table."),
        Ok(SchemaChange::AlreadyApplied) => (StatusCode::OK, "Columns already present."),
        Ok(SchemaChange::NotRequired) => {
            (StatusCode::OK, "Schema change not required for this backend.")
        }
        Err(e) => {
            tracing::error!(error = %e, "schema change failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your request. Please try again.",
            )
        }
    }
}
