//! File cache - A directory of JSON envelopes with expiry
//!
//! Mirrors collections that also live in the key/value store so a fresh
//! process can inspect recent state without touching the database.
//! Entries expire after the configured TTL. Memory and disk budgets are
//! reported by [`FileCache::stats`] and logged when exceeded, but nothing
//! is evicted to honour them.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

use crate::infrastructure::config::CacheConfig;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEnvelope {
    stored_at: DateTime<Utc>,
    payload: String,
}

/// Usage figures for the cache
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
    pub memory_budget_bytes: u64,
    pub disk_budget_bytes: u64,
    pub over_memory_budget: bool,
    pub over_disk_budget: bool,
}

pub struct FileCache {
    config: CacheConfig,
    memory: RwLock<HashMap<String, CacheEnvelope>>,
}

impl FileCache {
    pub async fn new(config: CacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.directory).await?;
        Ok(Self {
            config,
            memory: RwLock::new(HashMap::new()),
        })
    }

    pub fn directory(&self) -> &std::path::Path {
        &self.config.directory
    }

    /// Store a payload under `key`, replacing any previous entry
    pub async fn put(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        let envelope = CacheEnvelope {
            stored_at: Utc::now(),
            payload: payload.to_string(),
        };
        let encoded = serde_json::to_vec(&envelope)?;
        fs::write(self.entry_path(key), encoded).await?;
        self.memory.write().await.insert(key.to_string(), envelope);

        let stats = self.stats().await?;
        if stats.over_memory_budget || stats.over_disk_budget {
            tracing::warn!(
                memory_bytes = stats.memory_bytes,
                disk_bytes = stats.disk_bytes,
                "Cache exceeds its configured size budget"
            );
        }
        Ok(())
    }

    /// Fetch a payload if present and not expired. Expired entries are removed.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(envelope) = self.memory.read().await.get(key) {
            if !self.is_expired(envelope.stored_at) {
                return Ok(Some(envelope.payload.clone()));
            }
        }

        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: CacheEnvelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                self.remove(key).await?;
                return Ok(None);
            }
        };

        if self.is_expired(envelope.stored_at) {
            tracing::debug!(key = %key, "Cache entry expired");
            self.remove(key).await?;
            return Ok(None);
        }

        let payload = envelope.payload.clone();
        self.memory.write().await.insert(key.to_string(), envelope);
        Ok(Some(payload))
    }

    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.memory.write().await.remove(key);
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        let mut dir = fs::read_dir(&self.config.directory).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let expired = match fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice::<CacheEnvelope>(&bytes)
                    .map(|e| self.is_expired(e.stored_at))
                    .unwrap_or(true),
                Err(_) => true,
            };
            if expired {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        let mut memory = self.memory.write().await;
        memory.retain(|_, envelope| !is_expired(envelope.stored_at, self.config.ttl));

        if removed > 0 {
            tracing::info!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let (entries, memory_bytes) = {
            let memory = self.memory.read().await;
            let bytes: u64 = memory
                .iter()
                .map(|(k, v)| (k.len() + v.payload.len()) as u64)
                .sum();
            (memory.len(), bytes)
        };

        let mut disk_bytes = 0;
        let mut dir = fs::read_dir(&self.config.directory).await?;
        while let Some(entry) = dir.next_entry().await? {
            disk_bytes += entry.metadata().await?.len();
        }

        Ok(CacheStats {
            entries,
            memory_bytes,
            disk_bytes,
            memory_budget_bytes: self.config.memory_budget_bytes,
            disk_budget_bytes: self.config.disk_budget_bytes,
            over_memory_budget: memory_bytes > self.config.memory_budget_bytes,
            over_disk_budget: disk_bytes > self.config.disk_budget_bytes,
        })
    }

    fn is_expired(&self, stored_at: DateTime<Utc>) -> bool {
        is_expired(stored_at, self.config.ttl)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.config.directory.join(format!("{}.json", file_name))
    }
}

fn is_expired(stored_at: DateTime<Utc>, ttl: std::time::Duration) -> bool {
    match (Utc::now() - stored_at).to_std() {
        Ok(age) => age >= ttl,
        // Stored in the future (clock skew): treat as fresh
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(dir: &std::path::Path, ttl: Duration) -> CacheConfig {
        CacheConfig {
            directory: dir.to_path_buf(),
            ttl,
            memory_budget_bytes: 64,
            disk_budget_bytes: 1024 * 1024,
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(config(dir.path(), Duration::from_secs(3600)))
            .await
            .unwrap();

        cache.put("savedCharacters", "[]").await.unwrap();
        assert_eq!(cache.get("savedCharacters").await.unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("savedCharacters.json").exists());
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_survive_a_new_cache_instance() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = FileCache::new(config(dir.path(), Duration::from_secs(3600)))
                .await
                .unwrap();
            cache.put("a/b", "payload").await.unwrap();
        }
        let cache = FileCache::new(config(dir.path(), Duration::from_secs(3600)))
            .await
            .unwrap();
        assert_eq!(cache.get("a/b").await.unwrap().as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(config(dir.path(), Duration::ZERO)).await.unwrap();

        cache.put("stale", "old").await.unwrap();
        assert_eq!(cache.get("stale").await.unwrap(), None);
        assert!(!dir.path().join("stale.json").exists());

        cache.put("one", "1").await.unwrap();
        cache.put("two", "2").await.unwrap();
        assert_eq!(cache.purge_expired().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_budgets_are_reported_not_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(config(dir.path(), Duration::from_secs(3600)))
            .await
            .unwrap();

        let big = "x".repeat(200);
        cache.put("big", &big).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert!(stats.over_memory_budget);
        assert!(!stats.over_disk_budget);
        assert_eq!(cache.get("big").await.unwrap().as_deref(), Some(big.as_str()));
    }
}
