//! Note Service - A character's journal

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{CharacterRepositoryPort, NoteRepositoryPort};
use crate::application::services::{invalid, not_found, validate_text};
use crate::domain::entities::{Note, NoteCategory};
use crate::domain::value_objects::{CharacterId, NoteId};
use crate::infrastructure::persistence::Repositories;

const MAX_TITLE_LEN: usize = 255;
const MAX_CONTENT_LEN: usize = 50_000;

#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub category: NoteCategory,
    pub location: Option<String>,
    pub item: Option<String>,
    pub quest: Option<String>,
    pub lore: Option<String>,
}

/// Partial note update. Detail fields set to an empty string are cleared.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NoteCategory>,
    pub location: Option<String>,
    pub item: Option<String>,
    pub quest: Option<String>,
    pub lore: Option<String>,
}

#[async_trait]
pub trait NoteService: Send + Sync {
    async fn create_note(&self, character_id: CharacterId, request: CreateNoteRequest)
        -> Result<Note>;

    /// Notes of a character, most recently updated first
    async fn list_notes(
        &self,
        character_id: CharacterId,
        category: Option<NoteCategory>,
    ) -> Result<Vec<Note>>;

    async fn update_note(&self, id: NoteId, request: UpdateNoteRequest) -> Result<Note>;

    async fn delete_note(&self, id: NoteId) -> Result<()>;
}

pub struct NoteServiceImpl {
    characters: Arc<dyn CharacterRepositoryPort>,
    notes: Arc<dyn NoteRepositoryPort>,
}

impl NoteServiceImpl {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            characters: repositories.characters.clone(),
            notes: repositories.notes.clone(),
        }
    }

    async fn ensure_character(&self, id: CharacterId) -> Result<()> {
        self.characters
            .get(id)
            .await
            .context("Failed to get character from repository")?
            .map(|_| ())
            .ok_or_else(|| not_found("Character", id))
    }

    fn validate_content(content: &str) -> Result<()> {
        if content.len() > MAX_CONTENT_LEN {
            return Err(invalid(format!(
                "Note content cannot exceed {} characters",
                MAX_CONTENT_LEN
            )));
        }
        Ok(())
    }
}

fn detail(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[async_trait]
impl NoteService for NoteServiceImpl {
    #[instrument(skip(self, request), fields(character_id = %character_id, title = %request.title))]
    async fn create_note(
        &self,
        character_id: CharacterId,
        request: CreateNoteRequest,
    ) -> Result<Note> {
        validate_text("Note title", &request.title, MAX_TITLE_LEN)?;
        Self::validate_content(&request.content)?;
        self.ensure_character(character_id).await?;

        let mut note = Note::new(character_id, request.title.trim(), request.category)
            .with_content(request.content);
        note.location = request.location.and_then(detail);
        note.item = request.item.and_then(detail);
        note.quest = request.quest.and_then(detail);
        note.lore = request.lore.and_then(detail);

        self.notes
            .create(&note)
            .await
            .context("Failed to create note in repository")?;

        info!(note_id = %note.id, category = ?note.category, "Created note: {}", note.title);
        Ok(note)
    }

    #[instrument(skip(self))]
    async fn list_notes(
        &self,
        character_id: CharacterId,
        category: Option<NoteCategory>,
    ) -> Result<Vec<Note>> {
        self.ensure_character(character_id).await?;
        let notes = self
            .notes
            .list_by_character(character_id)
            .await
            .context("Failed to list notes from repository")?;

        Ok(match category {
            Some(category) => notes.into_iter().filter(|n| n.category == category).collect(),
            None => notes,
        })
    }

    #[instrument(skip(self, request), fields(note_id = %id))]
    async fn update_note(&self, id: NoteId, request: UpdateNoteRequest) -> Result<Note> {
        if let Some(ref title) = request.title {
            validate_text("Note title", title, MAX_TITLE_LEN)?;
        }
        if let Some(ref content) = request.content {
            Self::validate_content(content)?;
        }

        let note = self
            .notes
            .modify(
                id,
                Box::new(move |note: &mut Note| -> Result<()> {
                    if let Some(title) = request.title {
                        note.title = title.trim().to_string();
                    }
                    if let Some(content) = request.content {
                        note.content = content;
                    }
                    if let Some(category) = request.category {
                        note.category = category;
                    }
                    if let Some(location) = request.location {
                        note.location = detail(location);
                    }
                    if let Some(item) = request.item {
                        note.item = detail(item);
                    }
                    if let Some(quest) = request.quest {
                        note.quest = detail(quest);
                    }
                    if let Some(lore) = request.lore {
                        note.lore = detail(lore);
                    }
                    note.touch();
                    Ok(())
                }),
            )
            .await
            .context("Failed to update note in repository")?
            .ok_or_else(|| not_found("Note", id))?;

        debug!(note_id = %id, "Updated note: {}", note.title);
        Ok(note)
    }

    #[instrument(skip(self))]
    async fn delete_note(&self, id: NoteId) -> Result<()> {
        let deleted = self
            .notes
            .delete(id)
            .await
            .context("Failed to delete note from repository")?;
        if !deleted {
            return Err(not_found("Note", id));
        }
        info!(note_id = %id, "Deleted note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Character;

    async fn setup() -> (NoteServiceImpl, CharacterId) {
        let repositories = Repositories::in_memory();
        let character = Character::new("Keyleth", "Half-Elf", "Druid", "Hermit", "Neutral Good");
        repositories.characters.create(&character).await.unwrap();
        (NoteServiceImpl::new(&repositories), character.id)
    }

    #[tokio::test]
    async fn test_create_with_category_detail() {
        let (service, character_id) = setup().await;
        let note = service
            .create_note(
                character_id,
                CreateNoteRequest {
                    title: "The Aramente".to_string(),
                    content: "Visit each ashari tribe".to_string(),
                    category: NoteCategory::Quest,
                    quest: Some("Aramente".to_string()),
                    location: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(note.category_detail(), Some("Aramente"));
        assert!(note.location.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let (service, character_id) = setup().await;
        for (title, category) in [
            ("Zephrah", NoteCategory::Location),
            ("Vasselheim", NoteCategory::Location),
            ("Cloak of Elvenkind", NoteCategory::Item),
        ] {
            service
                .create_note(
                    character_id,
                    CreateNoteRequest {
                        title: title.to_string(),
                        category,
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        assert_eq!(service.list_notes(character_id, None).await.unwrap().len(), 3);
        let locations = service
            .list_notes(character_id, Some(NoteCategory::Location))
            .await
            .unwrap();
        assert_eq!(locations.len(), 2);
        assert!(service.list_notes(CharacterId::new(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (service, character_id) = setup().await;
        let note = service
            .create_note(
                character_id,
                CreateNoteRequest {
                    title: "Untitled".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_note(
                note.id,
                UpdateNoteRequest {
                    title: Some("Raishan".to_string()),
                    category: Some(NoteCategory::Npc),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Raishan");
        assert_eq!(updated.category, NoteCategory::Npc);

        assert!(service
            .update_note(
                note.id,
                UpdateNoteRequest {
                    title: Some(String::new()),
                    ..Default::default()
                }
            )
            .await
            .is_err());

        service.delete_note(note.id).await.unwrap();
        assert!(service.delete_note(note.id).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_keep_every_field() {
        let (service, character_id) = setup().await;
        let note = service
            .create_note(
                character_id,
                CreateNoteRequest {
                    title: "Untitled".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let id = note.id;
        let service = Arc::new(service);

        let requests = [
            UpdateNoteRequest {
                title: Some("Thordak".to_string()),
                ..Default::default()
            },
            UpdateNoteRequest {
                content: Some("Attacked Emon".to_string()),
                ..Default::default()
            },
            UpdateNoteRequest {
                category: Some(NoteCategory::Npc),
                ..Default::default()
            },
            UpdateNoteRequest {
                lore: Some("The Cinder King".to_string()),
                ..Default::default()
            },
        ];
        let tasks: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let service = service.clone();
                tokio::spawn(async move { service.update_note(id, request).await.unwrap() })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let notes = service.list_notes(character_id, None).await.unwrap();
        assert_eq!(notes[0].title, "Thordak");
        assert_eq!(notes[0].content, "Attacked Emon");
        assert_eq!(notes[0].category, NoteCategory::Npc);
        assert_eq!(notes[0].lore.as_deref(), Some("The Cinder King"));
    }
}
