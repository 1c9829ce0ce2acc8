//! Price server route handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::oracle::RateOracle;

pub type OracleState = Arc<dyn RateOracle>;

/// GET /bpi
///
/// Fresh fetch per request; the currency map is rendered as JSON with
/// codes in sorted order. Fetch failures become a 500 carrying the message.
pub async fn get_bpi(State(oracle): State<OracleState>) -> Response {
    let table = match oracle.fetch_rates().await {
        Ok(table) => table,
        Err(e) => {
            warn!(error = %e, "BPI passthrough fetch failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let sorted: BTreeMap<_, _> = table.bpi.iter().collect();
    match serde_json::to_string(&sorted) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
