//! EXCHANGER — ledger-backed currency exchange service
//!
//! Entry point. Stands in for the host runtime: loads configuration,
//! initialises structured logging, opens the ledger, stores the two
//! bootstrap arguments, starts the `/bpi` side channel, then dispatches
//! one command per stdin line until EOF or Ctrl+C.
//!
//! Usage: `exchanger <key> <value>`, then e.g. `exchange alice USD 5`.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use exchanger::config::{AppConfig, DiagnosticsConfig};
use exchanger::dispatcher::{parse_invocation, Dispatcher};
use exchanger::engine::ExchangeEngine;
use exchanger::oracle::{BpiClient, RateOracle};
use exchanger::server;
use exchanger::storage::{BalanceStore, JsonFileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("EXCHANGER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging(&cfg.diagnostics);

    info!(
        config = %config_path,
        oracle_url = %cfg.oracle.url,
        timeout_secs = cfg.oracle.timeout_secs,
        conversion = ?cfg.ledger.conversion,
        missing_balance = ?cfg.ledger.missing_balance,
        "EXCHANGER starting up"
    );

    // -- Initialise components -------------------------------------------

    let oracle: Arc<dyn RateOracle> = Arc::new(BpiClient::new(cfg.oracle.url.clone(), cfg.oracle_timeout())?);

    let store: Arc<dyn BalanceStore> = match &cfg.ledger.path {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => {
            info!("No ledger path configured, using in-memory ledger");
            Arc::new(MemoryStore::new())
        }
    };

    let engine = ExchangeEngine::new(oracle.clone(), store)
        .with_conversion(cfg.ledger.conversion.strategy())
        .with_missing_balance_policy(cfg.ledger.missing_balance);
    let dispatcher = Dispatcher::new(Arc::new(engine));

    // -- Bootstrap -------------------------------------------------------

    let bootstrap: Vec<String> = std::env::args().skip(1).collect();
    let init = dispatcher.init(&bootstrap);
    if !init.is_success() {
        bail!("Initialisation failed: {init}");
    }

    if cfg.server.enabled {
        server::spawn_server(oracle, cfg.server.port).await?;
    }

    // -- Command loop ----------------------------------------------------

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Ready. One command per line; Ctrl+C or EOF to stop.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command from stdin")? else {
                    info!("Input closed.");
                    break;
                };
                let Some((command, args)) = parse_invocation(&line) else {
                    continue;
                };
                let response = dispatcher.dispatch(&command, &args).await;
                println!("{response}");
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("EXCHANGER shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr; stdout carries
/// responses only.
fn init_logging(diagnostics: &DiagnosticsConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&diagnostics.log_filter));

    let json_logging = diagnostics.json_logs || std::env::var("EXCHANGER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
