//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Storage: SQLite and in-memory key/value backends
//! - Persistence: collection repositories over the key/value store
//! - Cache: file cache mirroring the saved characters
//! - Reference data: loaders for the bundled rules content
//! - Export: character document translators
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod cache;
pub mod config;
pub mod export;
pub mod http;
pub mod persistence;
pub mod reference_data;
pub mod state;
pub mod storage;
