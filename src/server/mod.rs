//! Price passthrough server — Axum side channel exposing the raw rate table.
//!
//! Shares nothing with the exchange engine except the oracle client, and
//! only ever reads from it.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub use routes::OracleState;

/// Bind `0.0.0.0:port` and serve in a background task.
///
/// Binding happens before returning so a taken port is reported to the
/// caller. Port 0 picks a free port; the bound address is returned.
pub async fn spawn_server(oracle: OracleState, port: u16) -> Result<(SocketAddr, JoinHandle<()>)> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind price server on {addr}"))?;
    let local = listener.local_addr().context("Price server has no local address")?;
    let app = build_router(oracle);

    info!(port = local.port(), "Price server listening on http://localhost:{}/bpi", local.port());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Price server stopped");
        }
    });

    Ok((local, handle))
}

/// Build the router with all routes and middleware.
pub fn build_router(oracle: OracleState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/bpi", get(routes::get_bpi))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(oracle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
