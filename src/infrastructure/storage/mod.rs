//! Key/value store implementations - Infrastructure adapters for the store port

mod factory;
mod memory_store;
mod sqlite_store;

pub use factory::{create_store, StoreBackend};
pub use memory_store::InMemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;
