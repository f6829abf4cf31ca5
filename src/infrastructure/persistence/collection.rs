//! One JSON array per collection, stored under a fixed key

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::ports::outbound::KeyValueStorePort;
use crate::infrastructure::cache::FileCache;

/// A whole collection serialized as one blob.
///
/// Every mutation reloads the blob, applies the change and writes the full
/// array back. Writers are serialized by a mutex so concurrent requests
/// cannot lose each other's updates.
pub struct JsonCollection<T> {
    store: Arc<dyn KeyValueStorePort>,
    key: &'static str,
    write_lock: Mutex<()>,
    mirror: Option<Arc<FileCache>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(store: Arc<dyn KeyValueStorePort>, key: &'static str) -> Self {
        Self {
            store,
            key,
            write_lock: Mutex::new(()),
            mirror: None,
            _marker: PhantomData,
        }
    }

    /// Also write each saved blob into the file cache
    pub fn with_mirror(mut self, cache: Arc<FileCache>) -> Self {
        self.mirror = Some(cache);
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load the collection. An undecodable blob yields an empty collection.
    pub async fn load(&self) -> Result<Vec<T>> {
        let Some(raw) = self
            .store
            .get(self.key)
            .await
            .with_context(|| format!("Failed to read {}", self.key))?
        else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Stored collection is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Apply `f` to the collection and persist the result
    pub async fn modify<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> R + Send,
        R: Send,
    {
        self.try_modify(|items| Ok(f(items))).await
    }

    /// Like [`modify`](Self::modify), but nothing is written when `f` fails
    pub async fn try_modify<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let result = f(&mut items)?;
        self.save(&items).await?;
        Ok(result)
    }

    async fn save(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)
            .with_context(|| format!("Failed to serialize {}", self.key))?;
        self.store
            .set(self.key, &json)
            .await
            .with_context(|| format!("Failed to write {}", self.key))?;

        if let Some(cache) = &self.mirror {
            if let Err(e) = cache.put(self.key, &json).await {
                tracing::warn!(key = self.key, error = %e, "Failed to mirror collection into cache");
            }
        }
        Ok(())
    }
}
