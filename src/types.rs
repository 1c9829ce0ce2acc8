//! Core domain types shared across all EXCHANGER modules.
//!
//! Covers the BPI price table as decoded from the rate source, the
//! exchange request, balance encoding, and the domain error enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Price table
// ---------------------------------------------------------------------------

/// Update timestamps published alongside the rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTimestamp {
    #[serde(default)]
    pub updated: String,
    #[serde(default, rename = "updatedISO")]
    pub updated_iso: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updateduk: String,
}

/// A single currency entry of the `bpi` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub symbol: String,
    /// Display rate, e.g. `"7,915.4833"`.
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rate_float: f64,
}

/// Snapshot of the rate source. One instance per fetch, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    #[serde(default)]
    pub time: UpdateTimestamp,
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default)]
    pub chart_name: String,
    /// Currency code → rate. Keys are case-sensitive.
    #[serde(default)]
    pub bpi: HashMap<String, CurrencyRate>,
}

impl PriceTable {
    /// Decode a price table from the rate source's JSON body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Exact-match lookup of a currency code.
    pub fn rate(&self, code: &str) -> Option<&CurrencyRate> {
        self.bpi.get(code)
    }
}

// ---------------------------------------------------------------------------
// Exchange request & balances
// ---------------------------------------------------------------------------

/// A validated exchange request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub address: String,
    pub currency_code: String,
    pub quantity: u64,
}

impl ExchangeRequest {
    /// Build a request from raw dispatcher arguments, parsing the quantity.
    pub fn parse(address: &str, currency_code: &str, quantity: &str) -> Result<Self, ExchangeError> {
        let quantity = quantity.parse::<u64>().map_err(|e| {
            ExchangeError::InvalidArgument(format!("invalid quantity {quantity:?}: {e}"))
        })?;
        Ok(Self {
            address: address.to_string(),
            currency_code: currency_code.to_string(),
            quantity,
        })
    }
}

/// Encode a balance the way it is stored on the ledger.
pub fn encode_balance(balance: u64) -> Vec<u8> {
    balance.to_string().into_bytes()
}

/// Decode a stored balance. Only plain unsigned decimal strings are accepted.
pub fn decode_balance(raw: &[u8]) -> Result<u64, String> {
    let text = std::str::from_utf8(raw).map_err(|e| format!("not utf-8: {e}"))?;
    if text.is_empty() {
        return Err("empty value".to_string());
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{text:?} is not a decimal integer"));
    }
    text.parse::<u64>().map_err(|e| format!("{text:?}: {e}"))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of a single rate fetch. Never retried inside the client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    #[error("rate fetch failed: {0}")]
    FetchFailed(String),

    #[error("rate decode failed: {0}")]
    DecodeFailed(String),
}

/// Domain errors surfaced to callers of the engine and dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("rate fetch failed: {0}")]
    FetchFailed(String),

    #[error("rate decode failed: {0}")]
    DecodeFailed(String),

    #[error("currency {0:?} not found")]
    UnknownCurrency(String),

    #[error("corrupt state at {address:?}: {reason}")]
    CorruptState { address: String, reason: String },

    #[error("store failed: {0}")]
    StoreFailed(String),
}

impl ExchangeError {
    /// Stable code carried in failure responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ExchangeError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ExchangeError::UnknownCommand(_) => "UNKNOWN_COMMAND",
            ExchangeError::FetchFailed(_) => "FETCH_FAILED",
            ExchangeError::DecodeFailed(_) => "DECODE_FAILED",
            ExchangeError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            ExchangeError::CorruptState { .. } => "CORRUPT_STATE",
            ExchangeError::StoreFailed(_) => "STORE_FAILED",
        }
    }
}

impl From<OracleError> for ExchangeError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::FetchFailed(msg) => ExchangeError::FetchFailed(msg),
            OracleError::DecodeFailed(msg) => ExchangeError::DecodeFailed(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// What the host runtime gets back for each invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Success { payload: Option<String> },
    Failure { code: &'static str, message: String },
}

impl Response {
    pub fn success(payload: impl Into<String>) -> Self {
        Response::Success { payload: Some(payload.into()) }
    }

    pub fn empty() -> Self {
        Response::Success { payload: None }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Error code of a failure response.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Response::Failure { code, .. } => Some(code),
            Response::Success { .. } => None,
        }
    }
}

impl From<ExchangeError> for Response {
    fn from(err: ExchangeError) -> Self {
        Response::Failure {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success { payload: Some(p) } => write!(f, "OK {p}"),
            Response::Success { payload: None } => write!(f, "OK"),
            Response::Failure { code, message } => write!(f, "ERR {code}: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
