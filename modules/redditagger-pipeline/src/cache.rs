//! In-process result cache with read-extends-lease semantics.
//!
//! Every successful `get` rewrites the entry's expiry to `now + ttl`, so a
//! table that keeps being read never expires. Uses tokio's clock so tests
//! can drive expiry with a paused runtime.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use redditagger_common::ResultTable;

use crate::traits::ResultCache;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3000);

struct CacheEntry {
    table: ResultTable,
    ttl: Duration,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries. Expired ones are evicted on their own read or on the
    /// next `set`.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn set(&self, key: &str, table: ResultTable, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("result cache lock poisoned"))?;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        if entries.len() < before {
            debug!(evicted = before - entries.len(), "Swept expired results");
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                table,
                ttl,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<ResultTable>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("result cache lock poisoned"))?;
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + entry.ttl;
                Ok(Some(entry.table.clone()))
            }
            Some(_) => {
                debug!(key, "Cached result expired");
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
