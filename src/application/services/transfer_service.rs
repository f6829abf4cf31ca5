//! Transfer Service - Export stored characters and import shared documents

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::ports::outbound::{
    CharacterRepositoryPort, FavoritesRepositoryPort, NoteRepositoryPort,
    RelationshipRepositoryPort,
};
use crate::application::services::not_found;
use crate::domain::aggregates::ReferenceCatalog;
use crate::domain::entities::{Character, FavoriteKind, ReferenceRecord};
use crate::domain::value_objects::CharacterId;
use crate::infrastructure::export::{
    export_basic, export_extended, export_external, import_any, ExportFormat, ImportFormat,
    ImportedCharacter,
};
use crate::infrastructure::persistence::Repositories;

/// What an import stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub format: ImportFormat,
    pub character: Character,
    pub relationships: usize,
    pub notes: usize,
    pub favorites: usize,
}

#[async_trait]
pub trait TransferService: Send + Sync {
    /// Serialize a stored character in the requested shape
    async fn export_character(&self, id: CharacterId, format: ExportFormat) -> Result<String>;

    /// Recognize and store a character document, with everything bundled in it
    async fn import_character(&self, document: &str) -> Result<ImportSummary>;
}

pub struct TransferServiceImpl {
    catalog: Arc<ReferenceCatalog>,
    characters: Arc<dyn CharacterRepositoryPort>,
    relationships: Arc<dyn RelationshipRepositoryPort>,
    notes: Arc<dyn NoteRepositoryPort>,
    favorites: Arc<dyn FavoritesRepositoryPort>,
}

impl TransferServiceImpl {
    pub fn new(catalog: Arc<ReferenceCatalog>, repositories: &Repositories) -> Self {
        Self {
            catalog,
            characters: repositories.characters.clone(),
            relationships: repositories.relationships.clone(),
            notes: repositories.notes.clone(),
            favorites: repositories.favorites.clone(),
        }
    }

    /// Store what was bundled with an imported character. Returns the favorites kept.
    async fn store_bundled(&self, imported: &ImportedCharacter) -> Result<usize> {
        let character_id = imported.character.id;
        self.relationships
            .create_many(&imported.relationships)
            .await
            .context("Failed to store imported relationships")?;
        self.notes
            .create_many(&imported.notes)
            .await
            .context("Failed to store imported notes")?;

        // Favorites only stick for records this catalog knows about
        let bundled = imported
            .favorite_spells
            .iter()
            .map(|s| (FavoriteKind::Spell, s.id()))
            .chain(
                imported
                    .favorite_monsters
                    .iter()
                    .map(|m| (FavoriteKind::Monster, m.id())),
            );
        let mut favorites = 0;
        for (kind, item_id) in bundled {
            if !self.catalog.contains(kind, item_id) {
                warn!(kind = ?kind, item_id, "Skipping favorite missing from reference data");
                continue;
            }
            self.favorites
                .set_favorite(character_id, kind, item_id, true)
                .await
                .context("Failed to store imported favorite")?;
            favorites += 1;
        }
        Ok(favorites)
    }

    /// Remove every record a failed import may have left behind
    async fn discard_import(&self, character_id: CharacterId) {
        if let Err(e) = self.relationships.delete_by_character(character_id).await {
            warn!(character_id = %character_id, error = %e, "Failed to discard relationships");
        }
        if let Err(e) = self.notes.delete_by_character(character_id).await {
            warn!(character_id = %character_id, error = %e, "Failed to discard notes");
        }
        if let Err(e) = self.favorites.clear_character(character_id).await {
            warn!(character_id = %character_id, error = %e, "Failed to discard favorites");
        }
        if let Err(e) = self.characters.delete(character_id).await {
            warn!(character_id = %character_id, error = %e, "Failed to discard character");
        }
    }
}

#[async_trait]
impl TransferService for TransferServiceImpl {
    #[instrument(skip(self))]
    async fn export_character(&self, id: CharacterId, format: ExportFormat) -> Result<String> {
        let character = self
            .characters
            .get(id)
            .await
            .context("Failed to get character from repository")?
            .ok_or_else(|| not_found("Character", id))?;

        let json = match format {
            ExportFormat::Basic => export_basic(&character)?,
            ExportFormat::External => export_external(&character)?,
            ExportFormat::Extended => {
                let relationships = self
                    .relationships
                    .list_by_character(id)
                    .await
                    .context("Failed to list relationships for export")?;
                let notes = self
                    .notes
                    .list_by_character(id)
                    .await
                    .context("Failed to list notes for export")?;
                let favorites = self
                    .favorites
                    .list_for_character(id)
                    .await
                    .context("Failed to list favorites for export")?;

                let spells: Vec<_> = favorites
                    .iter()
                    .filter(|f| f.kind == FavoriteKind::Spell)
                    .filter_map(|f| self.catalog.spell(&f.item_id).cloned())
                    .collect();
                let monsters: Vec<_> = favorites
                    .iter()
                    .filter(|f| f.kind == FavoriteKind::Monster)
                    .filter_map(|f| self.catalog.monster(&f.item_id).cloned())
                    .collect();

                export_extended(&character, &relationships, &notes, &spells, &monsters)?
            }
        };

        info!(character_id = %id, format = ?format, bytes = json.len(), "Exported character");
        Ok(json)
    }

    #[instrument(skip(self, document), fields(bytes = document.len()))]
    async fn import_character(&self, document: &str) -> Result<ImportSummary> {
        let imported = import_any(document)?;
        let character_id = imported.character.id;

        self.characters
            .create(&imported.character)
            .await
            .context("Failed to store imported character")?;
        let favorites = match self.store_bundled(&imported).await {
            Ok(favorites) => favorites,
            Err(e) => {
                warn!(character_id = %character_id, error = %e, "Discarding partial import");
                self.discard_import(character_id).await;
                return Err(e);
            }
        };

        info!(
            character_id = %character_id,
            format = %imported.format,
            "Imported character: {}",
            imported.character.name
        );
        Ok(ImportSummary {
            format: imported.format,
            relationships: imported.relationships.len(),
            notes: imported.notes.len(),
            favorites,
            character: imported.character,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{KeyValueStorePort, StoreError};
    use crate::domain::entities::{Note, NoteCategory, Relationship, Spell};
    use crate::infrastructure::export::TransferError;
    use crate::infrastructure::persistence::{CHARACTERS_KEY, NOTES_KEY, RELATIONSHIPS_KEY};
    use crate::infrastructure::storage::InMemoryKeyValueStore;

    /// Store that refuses writes to one key
    struct FailingStore {
        inner: InMemoryKeyValueStore,
        failing_key: &'static str,
    }

    #[async_trait]
    impl KeyValueStorePort for FailingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.failing_key {
                return Err(StoreError::Database("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }
    }

    fn catalog() -> Arc<ReferenceCatalog> {
        let spells: Vec<Spell> =
            serde_json::from_str(r#"[{"name": "Shield", "level": 1}, {"name": "Haste", "level": 3}]"#)
                .unwrap();
        Arc::new(ReferenceCatalog::new(spells, vec![], vec![], vec![], vec![]))
    }

    async fn seeded() -> (TransferServiceImpl, Repositories, Character) {
        let repositories = Repositories::in_memory();
        let character = Character::new("Percy", "Human", "Fighter", "Noble", "Chaotic Good");
        repositories.characters.create(&character).await.unwrap();
        repositories
            .relationships
            .create(&Relationship::new(character.id, "Cassandra").with_level(9))
            .await
            .unwrap();
        repositories
            .notes
            .create(&Note::new(character.id, "The Briarwoods", NoteCategory::Quest))
            .await
            .unwrap();
        repositories
            .favorites
            .set_favorite(character.id, FavoriteKind::Spell, "haste", true)
            .await
            .unwrap();
        (
            TransferServiceImpl::new(catalog(), &repositories),
            repositories,
            character,
        )
    }

    #[tokio::test]
    async fn test_extended_export_then_import_duplicates_everything() {
        let (service, repositories, character) = seeded().await;

        let json = service
            .export_character(character.id, ExportFormat::Extended)
            .await
            .unwrap();
        assert!(json.contains("Cassandra"));
        assert!(json.contains("Haste"));

        let summary = service.import_character(&json).await.unwrap();
        assert_eq!(summary.format, ImportFormat::Extended);
        assert_ne!(summary.character.id, character.id);
        assert_eq!(summary.relationships, 1);
        assert_eq!(summary.notes, 1);
        assert_eq!(summary.favorites, 1);

        let copy_id = summary.character.id;
        assert_eq!(repositories.characters.list().await.unwrap().len(), 2);
        let relationships = repositories
            .relationships
            .list_by_character(copy_id)
            .await
            .unwrap();
        assert_eq!(relationships[0].name, "Cassandra");
        assert_eq!(relationships[0].level(), 9);
        assert!(repositories
            .favorites
            .is_favorite(copy_id, FavoriteKind::Spell, "haste")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_external_export() {
        let (service, _, character) = seeded().await;
        let json = service
            .export_character(character.id, ExportFormat::External)
            .await
            .unwrap();
        assert!(json.contains("\"jsonType\": \"character\""));
    }

    #[tokio::test]
    async fn test_export_unknown_character_fails() {
        let (service, _, _) = seeded().await;
        assert!(service
            .export_character(CharacterId::new(), ExportFormat::Basic)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unrecognized_import_stores_nothing() {
        let (service, repositories, _) = seeded().await;
        let err = service.import_character("[1, 2, 3]").await.unwrap_err();
        assert!(err.downcast_ref::<TransferError>().is_some());
        assert_eq!(repositories.characters.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_no_partial_records() {
        let (service, _, character) = seeded().await;
        let json = service
            .export_character(character.id, ExportFormat::Extended)
            .await
            .unwrap();

        let store = InMemoryKeyValueStore::new();
        let failing = FailingStore {
            inner: store.clone(),
            failing_key: NOTES_KEY,
        };
        let repositories = Repositories::new(Arc::new(failing), None);
        let target = TransferServiceImpl::new(catalog(), &repositories);

        let err = target.import_character(&json).await.unwrap_err();
        assert!(err.to_string().contains("notes"));

        assert!(repositories.characters.list().await.unwrap().is_empty());
        let characters = store.get(CHARACTERS_KEY).await.unwrap().unwrap_or_default();
        assert!(!characters.contains("Percy"));
        let relationships = store
            .get(RELATIONSHIPS_KEY)
            .await
            .unwrap()
            .unwrap_or_default();
        assert!(!relationships.contains("Cassandra"));
    }
}
