//! Relationship repository backed by the key/value store

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::collection::JsonCollection;
use super::RELATIONSHIPS_KEY;
use crate::application::ports::outbound::{Edit, KeyValueStorePort, RelationshipRepositoryPort};
use crate::domain::entities::Relationship;
use crate::domain::value_objects::{CharacterId, RelationshipId};

pub struct KvRelationshipRepository {
    collection: JsonCollection<Relationship>,
}

impl KvRelationshipRepository {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            collection: JsonCollection::new(store, RELATIONSHIPS_KEY),
        }
    }
}

#[async_trait]
impl RelationshipRepositoryPort for KvRelationshipRepository {
    async fn create(&self, relationship: &Relationship) -> Result<()> {
        self.create_many(std::slice::from_ref(relationship)).await
    }

    async fn create_many(&self, relationships: &[Relationship]) -> Result<()> {
        let new_items = relationships.to_vec();
        let count = new_items.len();
        self.collection
            .modify(move |items| {
                items.retain(|r| !new_items.iter().any(|n| n.id == r.id));
                items.extend(new_items);
            })
            .await?;
        tracing::debug!("Stored {} relationship(s)", count);
        Ok(())
    }

    async fn get(&self, id: RelationshipId) -> Result<Option<Relationship>> {
        let mut found = self
            .collection
            .load()
            .await?
            .into_iter()
            .find(|r| r.id == id);
        if let Some(relationship) = &mut found {
            relationship.normalize();
        }
        Ok(found)
    }

    async fn list_by_character(&self, character_id: CharacterId) -> Result<Vec<Relationship>> {
        let mut relationships: Vec<Relationship> = self
            .collection
            .load()
            .await?
            .into_iter()
            .filter(|r| r.character_id == character_id)
            .collect();
        for relationship in relationships.iter_mut() {
            relationship.normalize();
        }
        relationships.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(relationships)
    }

    async fn modify<'a>(
        &self,
        id: RelationshipId,
        edit: Edit<'a, Relationship>,
    ) -> Result<Option<Relationship>> {
        let modified = self
            .collection
            .try_modify(move |items| {
                let Some(slot) = items.iter_mut().find(|r| r.id == id) else {
                    return Ok(None);
                };
                let mut relationship = slot.clone();
                relationship.normalize();
                edit(&mut relationship)?;
                *slot = relationship.clone();
                Ok(Some(relationship))
            })
            .await?;
        if modified.is_some() {
            tracing::debug!("Updated relationship: {}", id);
        }
        Ok(modified)
    }

    async fn delete(&self, id: RelationshipId) -> Result<bool> {
        self.collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|r| r.id != id);
                before != items.len()
            })
            .await
    }

    async fn delete_by_character(&self, character_id: CharacterId) -> Result<usize> {
        self.collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|r| r.character_id != character_id);
                before - items.len()
            })
            .await
    }
}
