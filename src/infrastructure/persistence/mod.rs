//! Key/value persistence adapters
//!
//! Each collection lives as one JSON blob under a fixed key. Every mutation
//! rewrites the whole blob.

mod character_repository;
mod collection;
mod favorites_repository;
mod note_repository;
mod relationship_repository;

pub use character_repository::KvCharacterRepository;
pub use collection::JsonCollection;
pub use favorites_repository::KvFavoritesRepository;
pub use note_repository::KvNoteRepository;
pub use relationship_repository::KvRelationshipRepository;

use std::sync::Arc;

use crate::application::ports::outbound::{
    CharacterRepositoryPort, FavoritesRepositoryPort, KeyValueStorePort, NoteRepositoryPort,
    RelationshipRepositoryPort,
};
use crate::infrastructure::cache::FileCache;

pub const CHARACTERS_KEY: &str = "savedCharacters";
pub const RELATIONSHIPS_KEY: &str = "savedRelationships";
pub const NOTES_KEY: &str = "savedNotes";
pub const FAVORITES_KEY: &str = "favoritesByCharacter";

/// Combined repository providing access to all collections
#[derive(Clone)]
pub struct Repositories {
    pub characters: Arc<dyn CharacterRepositoryPort>,
    pub relationships: Arc<dyn RelationshipRepositoryPort>,
    pub notes: Arc<dyn NoteRepositoryPort>,
    pub favorites: Arc<dyn FavoritesRepositoryPort>,
}

impl Repositories {
    /// Build every repository over one store. Character saves are mirrored
    /// into `cache` when one is given.
    pub fn new(store: Arc<dyn KeyValueStorePort>, cache: Option<Arc<FileCache>>) -> Self {
        Self {
            characters: Arc::new(KvCharacterRepository::new(store.clone(), cache)),
            relationships: Arc::new(KvRelationshipRepository::new(store.clone())),
            notes: Arc::new(KvNoteRepository::new(store.clone())),
            favorites: Arc::new(KvFavoritesRepository::new(store)),
        }
    }

    /// Repositories over a fresh in-memory store
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(crate::infrastructure::storage::InMemoryKeyValueStore::new()),
            None,
        )
    }
}
