//! Application configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Key/value storage backend
    pub storage: StorageConfig,
    /// File cache settings
    pub cache: CacheConfig,
    /// Directory holding the bundled reference data files
    pub assets_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

/// Which key/value backend holds the character collections
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// "sqlite" or "memory"
    pub backend: String,
    /// Path to the SQLite database file
    pub sqlite_path: String,
}

/// File cache location, lifetime and size budgets
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub directory: PathBuf,
    pub ttl: Duration,
    /// Soft budget for cached data held in memory, in bytes
    pub memory_budget_bytes: u64,
    /// Soft budget for cached data on disk, in bytes
    pub disk_budget_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data/cache"),
            ttl: Duration::from_secs(24 * 3600),
            memory_budget_bytes: 50 * 1024 * 1024,
            disk_budget_bytes: 100 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let cache_ttl_hours: u64 = env::var("CACHE_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .context("CACHE_TTL_HOURS must be a whole number of hours")?;
        let memory_budget_mb: u64 = env::var("CACHE_MEMORY_BUDGET_MB")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .context("CACHE_MEMORY_BUDGET_MB must be a number")?;
        let disk_budget_mb: u64 = env::var("CACHE_DISK_BUDGET_MB")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("CACHE_DISK_BUDGET_MB must be a number")?;

        Ok(Self {
            storage: StorageConfig {
                backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
                sqlite_path: env::var("SQLITE_PATH")
                    .unwrap_or_else(|_| "./data/charsheet.db".to_string()),
            },
            cache: CacheConfig {
                directory: env::var("CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data/cache")),
                ttl: Duration::from_secs(cache_ttl_hours * 3600),
                memory_budget_bytes: memory_budget_mb * 1024 * 1024,
                disk_budget_bytes: disk_budget_mb * 1024 * 1024,
            },
            assets_dir: env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}
