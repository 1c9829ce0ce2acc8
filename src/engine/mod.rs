//! Exchange engine — rate fetch, balance read, conversion, write-back.

pub mod conversion;
pub mod exchange;

pub use conversion::{ConversionKind, ConversionStrategy, FixedPointConversion, TruncatingConversion};
pub use exchange::{ExchangeEngine, MissingBalancePolicy};
