//! Relationship Service - NPCs a character has met and how they feel about them

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{CharacterRepositoryPort, RelationshipRepositoryPort};
use crate::application::services::{not_found, validate_text};
use crate::domain::entities::Relationship;
use crate::domain::value_objects::{CharacterId, RelationshipId};
use crate::infrastructure::persistence::Repositories;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Default)]
pub struct CreateRelationshipRequest {
    pub name: String,
    pub description: String,
    pub level: Option<u8>,
    pub is_alive: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRelationshipRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<u8>,
    pub is_alive: Option<bool>,
}

#[async_trait]
pub trait RelationshipService: Send + Sync {
    async fn create_relationship(
        &self,
        character_id: CharacterId,
        request: CreateRelationshipRequest,
    ) -> Result<Relationship>;

    /// Relationships of a character, sorted by name
    async fn list_relationships(&self, character_id: CharacterId) -> Result<Vec<Relationship>>;

    async fn update_relationship(
        &self,
        id: RelationshipId,
        request: UpdateRelationshipRequest,
    ) -> Result<Relationship>;

    /// Move the relationship level up or down, saturating at 0 and 10
    async fn adjust_level(&self, id: RelationshipId, delta: i32) -> Result<Relationship>;

    async fn delete_relationship(&self, id: RelationshipId) -> Result<()>;
}

pub struct RelationshipServiceImpl {
    characters: Arc<dyn CharacterRepositoryPort>,
    relationships: Arc<dyn RelationshipRepositoryPort>,
}

impl RelationshipServiceImpl {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            characters: repositories.characters.clone(),
            relationships: repositories.relationships.clone(),
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

    /// Apply `change` and stamp the relationship under the repository's write lock
    async fn modify<'a, F>(&self, id: RelationshipId, change: F) -> Result<Relationship>
    where
        F: FnOnce(&mut Relationship) + Send + 'a,
    {
        self.relationships
            .modify(
                id,
                Box::new(move |relationship: &mut Relationship| -> Result<()> {
                    change(relationship);
                    relationship.touch();
                    Ok(())
                }),
            )
            .await
            .context("Failed to update relationship in repository")?
            .ok_or_else(|| not_found("Relationship", id))
    }
}

#[async_trait]
impl RelationshipService for RelationshipServiceImpl {
    #[instrument(skip(self, request), fields(character_id = %character_id, name = %request.name))]
    async fn create_relationship(
        &self,
        character_id: CharacterId,
        request: CreateRelationshipRequest,
    ) -> Result<Relationship> {
        validate_text("Relationship name", &request.name, MAX_NAME_LEN)?;
        self.ensure_character(character_id).await?;

        let mut relationship = Relationship::new(character_id, request.name.trim())
            .with_description(request.description);
        if let Some(level) = request.level {
            relationship.set_level(level);
        }
        if let Some(is_alive) = request.is_alive {
            relationship.is_alive = is_alive;
        }

        self.relationships
            .create(&relationship)
            .await
            .context("Failed to create relationship in repository")?;

        info!(
            relationship_id = %relationship.id,
            status = relationship.status().display_name(),
            "Created relationship: {}",
            relationship.name
        );
        Ok(relationship)
    }

    #[instrument(skip(self))]
    async fn list_relationships(&self, character_id: CharacterId) -> Result<Vec<Relationship>> {
        self.ensure_character(character_id).await?;
        self.relationships
            .list_by_character(character_id)
            .await
            .context("Failed to list relationships from repository")
    }

    #[instrument(skip(self, request), fields(relationship_id = %id))]
    async fn update_relationship(
        &self,
        id: RelationshipId,
        request: UpdateRelationshipRequest,
    ) -> Result<Relationship> {
        if let Some(ref name) = request.name {
            validate_text("Relationship name", name, MAX_NAME_LEN)?;
        }

        let relationship = self
            .modify(id, |relationship| {
                if let Some(name) = request.name {
                    relationship.name = name.trim().to_string();
                }
                if let Some(description) = request.description {
                    relationship.description = description;
                }
                if let Some(level) = request.level {
                    relationship.set_level(level);
                }
                if let Some(is_alive) = request.is_alive {
                    relationship.is_alive = is_alive;
                }
            })
            .await?;
        debug!(relationship_id = %id, "Updated relationship: {}", relationship.name);
        Ok(relationship)
    }

    #[instrument(skip(self))]
    async fn adjust_level(&self, id: RelationshipId, delta: i32) -> Result<Relationship> {
        let mut before = None;
        let relationship = self
            .modify(id, |relationship| {
                before = Some(relationship.status());
                relationship.adjust_level(delta);
            })
            .await?;

        if let Some(before) = before.filter(|status| *status != relationship.status()) {
            info!(
                relationship_id = %id,
                from = before.display_name(),
                to = relationship.status().display_name(),
                "{} changed attitude",
                relationship.name
            );
        }
        Ok(relationship)
    }

    #[instrument(skip(self))]
    async fn delete_relationship(&self, id: RelationshipId) -> Result<()> {
        let deleted = self
            .relationships
            .delete(id)
            .await
            .context("Failed to delete relationship from repository")?;
        if !deleted {
            return Err(not_found("Relationship", id));
        }
        info!(relationship_id = %id, "Deleted relationship");
        Ok(())
    }
}
