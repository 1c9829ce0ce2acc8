//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `EXCHANGER_CONFIG`) and
//! deserializes into strongly-typed structs. Every section has defaults,
//! so a partial or absent file still yields a usable configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::engine::{ConversionKind, MissingBalancePolicy};

/// Default rate source.
pub const DEFAULT_ORACLE_URL: &str = "https://api.coindesk.com/v1/bpi/currentprice.json";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ORACLE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// The `/bpi` side-channel server.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { enabled: true, port: 8090 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON file backing the ledger. In-memory when unset.
    pub path: Option<String>,
    pub missing_balance: MissingBalancePolicy,
    pub conversion: ConversionKind,
}

/// Logging knobs, passed explicitly instead of read from process globals.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub log_filter: String,
    pub json_logs: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_filter: "exchanger=info".to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration")
    }

    pub fn oracle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.oracle.timeout_secs)
    }
}
