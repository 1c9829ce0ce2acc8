//! EXCHANGER — ledger-backed currency exchange service.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod oracle;
pub mod storage;
pub mod engine;
pub mod dispatcher;
pub mod server;
