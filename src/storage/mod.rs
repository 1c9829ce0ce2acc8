//! Key-value ledger adapters.
//!
//! The engine only sees the `BalanceStore` trait. Two implementations
//! are provided: an in-memory map and a JSON file that is rewritten on
//! every `put`, so a write is on disk before `put` returns.

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Ledger access by address key.
///
/// `get` on an unknown key may return `Ok(None)` or an empty value;
/// callers handle both.
#[cfg_attr(test, mockall::automock)]
pub trait BalanceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Must be durable before returning.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with string values.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        Self { entries: Mutex::new(map) }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BalanceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("ledger lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("ledger lock poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Ledger persisted as a JSON object of key → string value.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the ledger at `path`, starting empty if the file doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read ledger from {}", path.display()))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse ledger from {}", path.display()))?;
            info!(path = %path.display(), keys = entries.len(), "Ledger loaded from disk");
            entries
        } else {
            info!(path = %path.display(), "No ledger file found, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole map through a temp file and rename over the target.
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("Failed to serialise ledger")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write ledger to {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace ledger at {}", self.path.display()))?;
        Ok(())
    }
}

impl BalanceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("ledger lock poisoned"))?;
        Ok(entries.get(key).map(|v| v.as_bytes().to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let value = std::str::from_utf8(value)
            .with_context(|| format!("Value for {key:?} is not valid UTF-8"))?
            .to_string();

        let mut entries = self.entries.lock().map_err(|_| anyhow!("ledger lock poisoned"))?;
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries) {
            // Keep memory in step with disk.
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }

        debug!(key, path = %self.path.display(), "Ledger entry persisted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
