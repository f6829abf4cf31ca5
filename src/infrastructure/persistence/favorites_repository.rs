//! Favorite flags for reference records, keyed by (kind, item id, character id)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::collection::JsonCollection;
use super::FAVORITES_KEY;
use crate::application::ports::outbound::{FavoritesRepositoryPort, KeyValueStorePort};
use crate::domain::entities::{Favorite, FavoriteKind};
use crate::domain::value_objects::CharacterId;

pub struct KvFavoritesRepository {
    collection: JsonCollection<Favorite>,
}

impl KvFavoritesRepository {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            collection: JsonCollection::new(store, FAVORITES_KEY),
        }
    }
}

#[async_trait]
impl FavoritesRepositoryPort for KvFavoritesRepository {
    async fn is_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<bool> {
        Ok(self.collection.load().await?.iter().any(|f| {
            f.character_id == character_id && f.kind == kind && f.item_id == item_id
        }))
    }

    async fn set_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
        favorite: bool,
    ) -> Result<()> {
        let entry = Favorite {
            kind,
            item_id: item_id.to_string(),
            character_id,
        };
        self.collection
            .modify(move |items| {
                let exists = items.contains(&entry);
                if favorite && !exists {
                    items.push(entry);
                } else if !favorite && exists {
                    items.retain(|f| f != &entry);
                }
            })
            .await
    }

    async fn list_for_character(&self, character_id: CharacterId) -> Result<Vec<Favorite>> {
        let mut favorites: Vec<Favorite> = self
            .collection
            .load()
            .await?
            .into_iter()
            .filter(|f| f.character_id == character_id)
            .collect();
        favorites.sort();
        Ok(favorites)
    }

    async fn clear_character(&self, character_id: CharacterId) -> Result<usize> {
        self.collection
            .modify(move |items| {
                let before = items.len();
                items.retain(|f| f.character_id != character_id);
                before - items.len()
            })
            .await
    }
}
