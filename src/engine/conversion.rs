//! Rate-to-balance conversion strategies.
//!
//! `TruncatingConversion` reproduces the ledger's historical behaviour:
//! the rate is truncated to an integer before scaling, so any rate below
//! 1.0 yields a zero balance. `FixedPointConversion` scales with
//! `rust_decimal` and floors only the final product.

use rust_decimal::prelude::*;
use serde::Deserialize;

use crate::types::{CurrencyRate, ExchangeError};

/// Turns a currency rate and a quantity into a new balance.
pub trait ConversionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn convert(&self, rate: &CurrencyRate, quantity: u64) -> Result<u64, ExchangeError>;
}

/// Config-selectable strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    #[default]
    Truncate,
    FixedPoint,
}

impl ConversionKind {
    pub fn strategy(self) -> Box<dyn ConversionStrategy> {
        match self {
            ConversionKind::Truncate => Box::new(TruncatingConversion),
            ConversionKind::FixedPoint => Box::new(FixedPointConversion),
        }
    }
}

/// Rejects rates the feed should never publish.
fn checked_rate(rate: &CurrencyRate) -> Result<f64, ExchangeError> {
    let value = rate.rate_float;
    if !value.is_finite() || value < 0.0 {
        return Err(ExchangeError::DecodeFailed(format!(
            "unusable rate {value} for {}",
            rate.code
        )));
    }
    Ok(value)
}

fn overflow(rate: &CurrencyRate, quantity: u64) -> ExchangeError {
    ExchangeError::InvalidArgument(format!(
        "quantity {quantity} at rate {} overflows the balance range",
        rate.rate_float
    ))
}

/// `trunc(rate_float) * quantity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncatingConversion;

impl ConversionStrategy for TruncatingConversion {
    fn name(&self) -> &'static str {
        "truncate"
    }

    fn convert(&self, rate: &CurrencyRate, quantity: u64) -> Result<u64, ExchangeError> {
        let whole = checked_rate(rate)?.trunc();
        // 2^64 is exactly representable; anything at or above it can't be a u64.
        if whole >= 18_446_744_073_709_551_616.0 {
            return Err(overflow(rate, quantity));
        }
        (whole as u64)
            .checked_mul(quantity)
            .ok_or_else(|| overflow(rate, quantity))
    }
}

/// `floor(decimal(rate_float) * quantity)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPointConversion;

impl ConversionStrategy for FixedPointConversion {
    fn name(&self) -> &'static str {
        "fixed_point"
    }

    fn convert(&self, rate: &CurrencyRate, quantity: u64) -> Result<u64, ExchangeError> {
        let value = checked_rate(rate)?;
        let rate_dec = Decimal::from_f64(value).ok_or_else(|| overflow(rate, quantity))?;

        rate_dec
            .checked_mul(Decimal::from(quantity))
            .map(|product| product.floor())
            .and_then(|product| product.to_u64())
            .ok_or_else(|| overflow(rate, quantity))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
