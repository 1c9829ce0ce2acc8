//! Rate oracle integration.
//!
//! Defines the `RateOracle` trait and the HTTP client for the
//! Bitcoin Price Index feed.

pub mod bpi;

use async_trait::async_trait;

use crate::types::{OracleError, PriceTable};

pub use bpi::BpiClient;

/// Abstraction over a remote price source.
///
/// Every call fetches a fresh table; implementors must not cache and
/// must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateOracle: Send + Sync {
    /// Fetch the current price table.
    async fn fetch_rates(&self) -> Result<PriceTable, OracleError>;
}
