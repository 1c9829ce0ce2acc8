//! Bitcoin Price Index HTTP client.
//!
//! Fetches `currentprice.json` style documents:
//! `{time:{...}, disclaimer, chartName, bpi:{CODE:{code, symbol, rate, description, rate_float}}}`.
//!
//! One outbound request per call, bounded by the timeout given at
//! construction. No caching, no retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::RateOracle;
use crate::types::{OracleError, PriceTable};

const USER_AGENT: &str = "EXCHANGER/0.1.0";

/// HTTP client for a BPI rate source.
pub struct BpiClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl BpiClient {
    /// Create a client for `url`. `timeout` bounds the whole request,
    /// connection through body.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for BPI")?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl RateOracle for BpiClient {
    async fn fetch_rates(&self) -> Result<PriceTable, OracleError> {
        debug!(url = %self.url, "Fetching BPI rates");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| OracleError::FetchFailed(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(url = %self.url, %status, "BPI source returned non-200");
            return Err(OracleError::FetchFailed(status.to_string()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| OracleError::FetchFailed(e.to_string()))?;

        let table = PriceTable::from_json(&body)
            .map_err(|e| OracleError::DecodeFailed(e.to_string()))?;

        debug!(currencies = table.bpi.len(), "BPI rates decoded");
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
