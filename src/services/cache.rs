//! Time-bounded caching of UF lookups
//!
//! Lookups are cached for an hour so repeated calls don't hit the
//! rate-limited upstream APIs. `FileCache` persists across CLI runs,
//! `MemoryCache` lives for the process only.

use crate::services::clock::{Clock, SystemClock};
use crate::types::{RateResult, Result, UfError};
use chrono::{DateTime, Utc};
use directories::BaseDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cache key for the UF value
pub const CACHE_KEY: &str = "uf_value";

/// Key-value store with per-entry expiry
pub trait RateCache: Send + Sync {
    /// Live entry for `key`; expired entries read as absent
    fn get(&self, key: &str) -> Option<RateResult>;

    fn set(&self, key: &str, value: &RateResult, ttl: Duration) -> Result<()>;

    fn forget(&self, key: &str) -> Result<()>;
}

/// Cached result with its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub expires_at: DateTime<Utc>,
    pub result: RateResult,
}

impl CacheEntry {
    fn new(key: &str, result: &RateResult, now: DateTime<Utc>, ttl: Duration) -> Result<Self> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| UfError::Cache(format!("TTL out of range: {}", e)))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| UfError::Cache(format!("TTL out of range: {}s", ttl.num_seconds())))?;
        Ok(Self {
            key: key.to_string(),
            expires_at,
            result: result.clone(),
        })
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local cache guarded by a mutex
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock can't leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RateCache for MemoryCache {
    fn get(&self, key: &str) -> Option<RateResult> {
        let now = self.clock.now();
        let mut entries = self.entries();
        let live = entries.get(key)?.is_live(now);
        if live {
            entries.get(key).map(|entry| entry.result.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    fn set(&self, key: &str, value: &RateResult, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(key, value, self.clock.now(), ttl)?;
        self.entries().insert(key.to_string(), entry);
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// JSON-file cache under ~/.ufrate/cache, one file per key
pub struct FileCache {
    cache_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Create a cache in the default directory (~/.ufrate/cache)
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| UfError::Cache("Cannot determine home directory".into()))?;
        let cache_dir = base_dirs.home_dir().join(".ufrate").join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self::with_cache_dir(cache_dir))
    }

    /// Create a cache with a custom directory
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self::with_cache_dir_and_clock(cache_dir, Arc::new(SystemClock))
    }

    pub fn with_cache_dir_and_clock(cache_dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { cache_dir, clock }
    }

    /// Get the cache file path for a key
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        let path = self.cache_path(key);
        let mut file = File::open(&path).ok()?;
        FileExt::lock_shared(&file).ok()?;

        let mut content = String::new();
        let read = file.read_to_string(&mut content);
        let _ = FileExt::unlock(&file);
        read.ok()?;

        // Corrupted cache reads as a miss
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        if entry.key == key {
            Some(entry)
        } else {
            None
        }
    }
}

impl RateCache for FileCache {
    fn get(&self, key: &str) -> Option<RateResult> {
        let entry = self.load(key)?;
        if entry.is_live(self.clock.now()) {
            Some(entry.result)
        } else {
            // Expired; the next successful lookup overwrites it
            None
        }
    }

    fn set(&self, key: &str, value: &RateResult, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let entry = CacheEntry::new(key, value, self.clock.now(), ttl)?;
        let content = serde_json::to_string_pretty(&entry)
            .map_err(|e| UfError::Cache(format!("Serialization failed: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.cache_path(key))?;
        FileExt::lock_exclusive(&file)?;

        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(content.as_bytes()))
            .and_then(|_| file.flush());
        let _ = FileExt::unlock(&file);
        written?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<()> {
        let path = self.cache_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
