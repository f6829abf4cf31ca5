//! Note repository backed by the key/value store

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::collection::JsonCollection;
use super::NOTES_KEY;
use crate::application::ports::outbound::{Edit, KeyValueStorePort, NoteRepositoryPort};
use crate::domain::entities::Note;
use crate::domain::value_objects::{CharacterId, NoteId};

pub struct KvNoteRepository {
    collection: JsonCollection<Note>,
}

impl KvNoteRepository {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            collection: JsonCollection::new(store, NOTES_KEY),
        }
    }
}

#[async_trait]
impl NoteRepositoryPort for KvNoteRepository {
    async fn create(&self, note: &Note) -> Result<()> {
        self.create_many(std::slice::from_ref(note)).await
    }

    async fn create_many(&self, notes: &[Note]) -> Result<()> {
        let new_items = notes.to_vec();
        self.collection
            .modify(move |items| {
                items.retain(|n| !new_items.iter().any(|new| new.id == n.id));
                items.extend(new_items);
            })
            .await
    }

    async fn get(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self
            .collection
            .load()
            .await?
            .into_iter()
            .find(|n| n.id == id))
    }

    /// Newest first
    async fn list_by_character(&self, character_id: CharacterId) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .collection
            .load()
            .await?
            .into_iter()
            .filter(|n| n.character_id == character_id)
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn modify<'a>(&self, id: NoteId, edit: Edit<'a, Note>) -> Result<Option<Note>> {
        let modified = self
            .collection
            .try_modify(move |items| {
                let Some(slot) = items.iter_mut().find(|n| n.id == id) else {
                    return Ok(None);
                };
                let mut note = slot.clone();
                edit(&mut note)?;
                *slot = note.clone();
                Ok(Some(note))
            })
            .await?;
        if modified.is_some() {
            tracing::debug!("Updated note: {}", id);
        }
        Ok(modified)
    }

    async fn delete(&self, id: NoteId) -> Result<bool> {
        self.collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|n| n.id != id);
                before != items.len()
            })
            .await
    }

    async fn delete_by_character(&self, character_id: CharacterId) -> Result<usize> {
        self.collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|n| n.character_id != character_id);
                before - items.len()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NoteCategory;
    use crate::infrastructure::storage::InMemoryKeyValueStore;

    #[tokio::test]
    async fn test_notes_round_trip_through_store() {
        let repo = KvNoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let owner = CharacterId::new();
        let note = Note::new(owner, "Ancient runes", NoteCategory::Lore)
            .with_lore("Netherese script")
            .with_content("Found under the keep");
        repo.create(&note).await.unwrap();

        let listed = repo.list_by_character(owner).await.unwrap();
        assert_eq!(listed, vec![note.clone()]);
        assert!(repo.list_by_character(CharacterId::new()).await.unwrap().is_empty());

        assert_eq!(repo.delete_by_character(owner).await.unwrap(), 1);
        assert!(repo.get(note.id).await.unwrap().is_none());
    }
}
