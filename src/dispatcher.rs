//! Request dispatcher — command name + string args → engine call → response.
//!
//! Recognised commands:
//! - `exchange <address> <currency> <quantity>`
//! - `get <address>`
//! - `set <address> <value>`
//!
//! Arity is checked before anything else, so a malformed invocation never
//! reaches the oracle or the ledger.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::ExchangeEngine;
use crate::types::{ExchangeError, ExchangeRequest, Response};

pub struct Dispatcher {
    engine: Arc<ExchangeEngine>,
}

impl Dispatcher {
    pub fn new(engine: Arc<ExchangeEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ExchangeEngine {
        &self.engine
    }

    /// Store the two bootstrap arguments (key, value) verbatim.
    pub fn init(&self, args: &[String]) -> Response {
        let [key, value] = args else {
            return ExchangeError::InvalidArgument(format!(
                "expecting a key and a value, got {} args",
                args.len()
            ))
            .into();
        };

        match self.engine.init(key, value) {
            Ok(()) => Response::empty(),
            Err(e) => e.into(),
        }
    }

    /// Route one invocation.
    pub async fn dispatch(&self, command: &str, args: &[String]) -> Response {
        let tx_id = Uuid::new_v4();
        debug!(%tx_id, command, args = args.len(), "Dispatching");

        let result = match command {
            "exchange" => self.exchange(args).await,
            "get" => self.get(args),
            "set" => self.set(args),
            other => Err(ExchangeError::UnknownCommand(other.to_string())),
        };

        match result {
            Ok(balance) => Response::success(format!("balance: {balance}")),
            Err(e) => {
                warn!(%tx_id, command, code = e.error_code(), error = %e, "Invocation failed");
                e.into()
            }
        }
    }

    async fn exchange(&self, args: &[String]) -> Result<u64, ExchangeError> {
        let [address, currency, quantity] = args else {
            return Err(arity("exchange", 3, "addr currency quantity", args));
        };
        let req = ExchangeRequest::parse(address, currency, quantity)?;
        self.engine.exchange(&req).await
    }

    fn get(&self, args: &[String]) -> Result<u64, ExchangeError> {
        let [address] = args else {
            return Err(arity("get", 1, "addr", args));
        };
        self.engine.get_balance(address)
    }

    fn set(&self, args: &[String]) -> Result<u64, ExchangeError> {
        let [address, value] = args else {
            return Err(arity("set", 2, "addr value", args));
        };
        self.engine.set_balance(address, value)
    }
}

/// Split one whitespace-separated host line into command and arguments.
/// Blank lines yield `None`.
pub fn parse_invocation(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(str::to_string);
    let command = parts.next()?;
    Some((command, parts.collect()))
}

fn arity(command: &str, expected: usize, usage: &str, args: &[String]) -> ExchangeError {
    ExchangeError::InvalidArgument(format!(
        "{command}: expected {expected} args ({usage}), got {}",
        args.len()
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
