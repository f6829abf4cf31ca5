//! Character repository backed by the key/value store

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::collection::JsonCollection;
use super::CHARACTERS_KEY;
use crate::application::ports::outbound::{CharacterRepositoryPort, Edit, KeyValueStorePort};
use crate::domain::entities::Character;
use crate::domain::value_objects::CharacterId;
use crate::infrastructure::cache::FileCache;

/// Repository for Character operations
pub struct KvCharacterRepository {
    collection: JsonCollection<Character>,
}

impl KvCharacterRepository {
    pub fn new(store: Arc<dyn KeyValueStorePort>, cache: Option<Arc<FileCache>>) -> Self {
        let collection = JsonCollection::new(store, CHARACTERS_KEY);
        let collection = match cache {
            Some(cache) => collection.with_mirror(cache),
            None => collection,
        };
        Self { collection }
    }
}

#[async_trait]
impl CharacterRepositoryPort for KvCharacterRepository {
    async fn create(&self, character: &Character) -> Result<()> {
        let character = character.clone();
        let name = character.name.clone();
        self.collection
            .modify(move |items| {
                items.retain(|c| c.id != character.id);
                items.push(character);
            })
            .await?;
        tracing::debug!("Created character: {}", name);
        Ok(())
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>> {
        let mut found = self
            .collection
            .load()
            .await?
            .into_iter()
            .find(|c| c.id == id);
        if let Some(character) = &mut found {
            character.normalize();
        }
        Ok(found)
    }

    async fn list(&self) -> Result<Vec<Character>> {
        let mut characters = self.collection.load().await?;
        for character in characters.iter_mut() {
            character.normalize();
        }
        characters.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(characters)
    }

    async fn modify<'a>(
        &self,
        id: CharacterId,
        edit: Edit<'a, Character>,
    ) -> Result<Option<Character>> {
        let modified = self
            .collection
            .try_modify(move |items| {
                let Some(slot) = items.iter_mut().find(|c| c.id == id) else {
                    return Ok(None);
                };
                let mut character = slot.clone();
                character.normalize();
                edit(&mut character)?;
                *slot = character.clone();
                Ok(Some(character))
            })
            .await?;
        if modified.is_some() {
            tracing::debug!("Updated character: {}", id);
        }
        Ok(modified)
    }

    async fn delete(&self, id: CharacterId) -> Result<bool> {
        let removed = self
            .collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|c| c.id != id);
                before != items.len()
            })
            .await?;
        tracing::debug!("Deleted character: {} (existed: {})", id, removed);
        Ok(removed)
    }
}
