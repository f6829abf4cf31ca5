//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{Character, Favorite, FavoriteKind, Note, Relationship};
use crate::domain::value_objects::{CharacterId, NoteId, RelationshipId};

/// An in-place change applied while the repository holds its write lock.
/// Returning an error leaves the stored record untouched.
pub type Edit<'a, T> = Box<dyn FnOnce(&mut T) -> Result<()> + Send + 'a>;

// =============================================================================
// Character Repository Port
// =============================================================================

/// Repository port for Character operations
#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    /// Create a new character
    async fn create(&self, character: &Character) -> Result<()>;

    /// Get a character by ID
    async fn get(&self, id: CharacterId) -> Result<Option<Character>>;

    /// List all characters
    async fn list(&self) -> Result<Vec<Character>>;

    /// Load, change and store one character atomically.
    /// Returns `None` when the character does not exist.
    async fn modify<'a>(&self, id: CharacterId, edit: Edit<'a, Character>)
        -> Result<Option<Character>>;

    /// Delete a character, returning whether it existed
    async fn delete(&self, id: CharacterId) -> Result<bool>;
}

// =============================================================================
// Relationship Repository Port
// =============================================================================

/// Repository port for NPC relationships
#[async_trait]
pub trait RelationshipRepositoryPort: Send + Sync {
    async fn create(&self, relationship: &Relationship) -> Result<()>;

    /// Insert several relationships in one write
    async fn create_many(&self, relationships: &[Relationship]) -> Result<()>;

    async fn get(&self, id: RelationshipId) -> Result<Option<Relationship>>;

    async fn list_by_character(&self, character_id: CharacterId) -> Result<Vec<Relationship>>;

    async fn modify<'a>(
        &self,
        id: RelationshipId,
        edit: Edit<'a, Relationship>,
    ) -> Result<Option<Relationship>>;

    async fn delete(&self, id: RelationshipId) -> Result<bool>;

    /// Remove every relationship owned by a character, returning how many were removed
    async fn delete_by_character(&self, character_id: CharacterId) -> Result<usize>;
}

// =============================================================================
// Note Repository Port
// =============================================================================

/// Repository port for journal notes
#[async_trait]
pub trait NoteRepositoryPort: Send + Sync {
    async fn create(&self, note: &Note) -> Result<()>;

    /// Insert several notes in one write
    async fn create_many(&self, notes: &[Note]) -> Result<()>;

    async fn get(&self, id: NoteId) -> Result<Option<Note>>;

    async fn list_by_character(&self, character_id: CharacterId) -> Result<Vec<Note>>;

    async fn modify<'a>(&self, id: NoteId, edit: Edit<'a, Note>) -> Result<Option<Note>>;

    async fn delete(&self, id: NoteId) -> Result<bool>;

    async fn delete_by_character(&self, character_id: CharacterId) -> Result<usize>;
}

// =============================================================================
// Favorites Repository Port
// =============================================================================

/// Repository port for per-character favorite flags on reference records
#[async_trait]
pub trait FavoritesRepositoryPort: Send + Sync {
    async fn is_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<bool>;

    /// Set or clear a favorite flag
    async fn set_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
        favorite: bool,
    ) -> Result<()>;

    async fn list_for_character(&self, character_id: CharacterId) -> Result<Vec<Favorite>>;

    async fn clear_character(&self, character_id: CharacterId) -> Result<usize>;
}
