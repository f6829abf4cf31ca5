//! Store factory - Creates the key/value backend selected by configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::application::ports::outbound::{KeyValueStorePort, StoreError};
use crate::infrastructure::config::StorageConfig;
use crate::infrastructure::storage::{InMemoryKeyValueStore, SqliteKeyValueStore};

/// Enum wrapper for store backends to enable runtime selection
#[derive(Clone)]
pub enum StoreBackend {
    Memory(InMemoryKeyValueStore),
    Sqlite(SqliteKeyValueStore),
}

#[async_trait]
impl KeyValueStorePort for StoreBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            StoreBackend::Memory(s) => s.get(key).await,
            StoreBackend::Sqlite(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(s) => s.set(key, value).await,
            StoreBackend::Sqlite(s) => s.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(s) => s.remove(key).await,
            StoreBackend::Sqlite(s) => s.remove(key).await,
        }
    }
}

/// Create the configured key/value store
pub async fn create_store(config: &StorageConfig) -> Result<Arc<StoreBackend>> {
    match config.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory key/value store");
            Ok(Arc::new(StoreBackend::Memory(InMemoryKeyValueStore::new())))
        }
        "sqlite" => {
            // Ensure data directory exists
            if let Some(parent) = std::path::Path::new(&config.sqlite_path).parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create storage database directory")?;
            }

            let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.sqlite_path))
                .await
                .context("Failed to connect to SQLite storage database")?;
            tracing::info!("Connected to SQLite storage database: {}", config.sqlite_path);

            let store = SqliteKeyValueStore::new(pool)
                .await
                .context("Failed to initialize key/value table")?;
            Ok(Arc::new(StoreBackend::Sqlite(store)))
        }
        backend => anyhow::bail!("Unsupported storage backend: {}", backend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = StorageConfig {
            backend: "memory".to_string(),
            sqlite_path: String::new(),
        };
        let store = create_store(&config).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_sqlite_backend_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("charsheet.db");
        let config = StorageConfig {
            backend: "sqlite".to_string(),
            sqlite_path: path.to_string_lossy().to_string(),
        };
        let store = create_store(&config).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let config = StorageConfig {
            backend: "redis".to_string(),
            sqlite_path: String::new(),
        };
        assert!(create_store(&config).await.is_err());
    }
}
