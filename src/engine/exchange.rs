//! Exchange engine.
//!
//! Each exchange fetches a fresh price table, checks the address already
//! holds a readable balance, converts `quantity` at the requested
//! currency's rate and overwrites the stored balance with the result.
//! Nothing is written unless every earlier step succeeded.
//!
//! The engine holds no per-call state. Serialising calls for the same
//! address is the host runtime's job.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::conversion::{ConversionStrategy, TruncatingConversion};
use crate::oracle::RateOracle;
use crate::storage::BalanceStore;
use crate::types::{decode_balance, encode_balance, ExchangeError, ExchangeRequest};

/// What to do when an address has no stored balance yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum MissingBalancePolicy {
    /// Surface `CorruptState`; the address must be seeded first.
    #[default]
    #[serde(rename = "reject")]
    Reject,
    /// Treat an absent key as a zero balance. Garbled values still fail.
    #[serde(rename = "zero")]
    ZeroDefault,
}

pub struct ExchangeEngine {
    oracle: Arc<dyn RateOracle>,
    store: Arc<dyn BalanceStore>,
    conversion: Box<dyn ConversionStrategy>,
    missing_balance: MissingBalancePolicy,
}

impl ExchangeEngine {
    /// Engine with truncating conversion and `MissingBalancePolicy::Reject`.
    pub fn new(oracle: Arc<dyn RateOracle>, store: Arc<dyn BalanceStore>) -> Self {
        Self {
            oracle,
            store,
            conversion: Box::new(TruncatingConversion),
            missing_balance: MissingBalancePolicy::default(),
        }
    }

    pub fn with_conversion(mut self, conversion: Box<dyn ConversionStrategy>) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn with_missing_balance_policy(mut self, policy: MissingBalancePolicy) -> Self {
        self.missing_balance = policy;
        self
    }

    pub fn conversion_name(&self) -> &'static str {
        self.conversion.name()
    }

    pub fn missing_balance_policy(&self) -> MissingBalancePolicy {
        self.missing_balance
    }

    /// Convert `req.quantity` at the current rate and store the result as
    /// the address's new balance.
    pub async fn exchange(&self, req: &ExchangeRequest) -> Result<u64, ExchangeError> {
        let table = self.oracle.fetch_rates().await.map_err(|e| {
            warn!(address = %req.address, error = %e, "Rate fetch failed");
            ExchangeError::from(e)
        })?;

        let previous = self.read_balance(&req.address)?;

        let rate = table
            .rate(&req.currency_code)
            .ok_or_else(|| ExchangeError::UnknownCurrency(req.currency_code.clone()))?;

        let balance = self.conversion.convert(rate, req.quantity)?;

        self.write_balance(&req.address, balance)?;

        info!(
            address = %req.address,
            currency = %req.currency_code,
            quantity = req.quantity,
            rate = rate.rate_float,
            conversion = self.conversion.name(),
            previous,
            balance,
            "Exchange applied"
        );
        Ok(balance)
    }

    /// Read-only balance lookup.
    pub fn get_balance(&self, address: &str) -> Result<u64, ExchangeError> {
        let balance = self.read_balance(address)?;
        debug!(address, balance, "Balance read");
        Ok(balance)
    }

    /// Overwrite a balance with a validated value.
    pub fn set_balance(&self, address: &str, value: &str) -> Result<u64, ExchangeError> {
        let balance = value.parse::<u64>().map_err(|e| {
            ExchangeError::InvalidArgument(format!("invalid balance {value:?}: {e}"))
        })?;
        self.write_balance(address, balance)?;
        info!(address, balance, "Balance set");
        Ok(balance)
    }

    /// Store a bootstrap key/value pair verbatim.
    pub fn init(&self, key: &str, value: &str) -> Result<(), ExchangeError> {
        self.store
            .put(key, value.as_bytes())
            .map_err(|e| ExchangeError::StoreFailed(format!("failed to create asset {key:?}: {e:#}")))?;
        info!(key, "Ledger initialised");
        Ok(())
    }

    fn read_balance(&self, address: &str) -> Result<u64, ExchangeError> {
        let raw = self
            .store
            .get(address)
            .map_err(|e| ExchangeError::StoreFailed(format!("read {address:?}: {e:#}")))?;

        match raw {
            Some(bytes) if !bytes.is_empty() => {
                decode_balance(&bytes).map_err(|reason| ExchangeError::CorruptState {
                    address: address.to_string(),
                    reason,
                })
            }
            _ => match self.missing_balance {
                MissingBalancePolicy::ZeroDefault => Ok(0),
                MissingBalancePolicy::Reject => Err(ExchangeError::CorruptState {
                    address: address.to_string(),
                    reason: "no balance recorded".to_string(),
                }),
            },
        }
    }

    fn write_balance(&self, address: &str, balance: u64) -> Result<(), ExchangeError> {
        self.store
            .put(address, &encode_balance(balance))
            .map_err(|e| ExchangeError::StoreFailed(format!("write {address:?}: {e:#}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
