//! Reference Service - Rules content lookups and per-character favorites

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::ports::outbound::{CharacterRepositoryPort, FavoritesRepositoryPort};
use crate::application::services::not_found;
use crate::domain::aggregates::ReferenceCatalog;
use crate::domain::entities::{Background, FavoriteKind, Feat, MagicItem, Monster, Spell};
use crate::domain::value_objects::CharacterId;
use crate::infrastructure::persistence::Repositories;

/// A character's favorites resolved against the catalog
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterFavorites {
    pub spells: Vec<Spell>,
    pub monsters: Vec<Monster>,
    pub feats: Vec<Feat>,
    pub backgrounds: Vec<Background>,
    pub magic_items: Vec<MagicItem>,
}

#[async_trait]
pub trait ReferenceService: Send + Sync {
    fn search_spells(
        &self,
        name: Option<&str>,
        level: Option<u8>,
        class_name: Option<&str>,
    ) -> Vec<Spell>;

    fn search_monsters(
        &self,
        name: Option<&str>,
        min_cr: Option<f32>,
        max_cr: Option<f32>,
    ) -> Vec<Monster>;

    fn search_feats(&self, name: Option<&str>) -> Vec<Feat>;

    fn search_backgrounds(&self, name: Option<&str>) -> Vec<Background>;

    fn search_magic_items(&self, name: Option<&str>, rarity: Option<&str>) -> Vec<MagicItem>;

    /// Flip the favorite flag of a reference record, returning the new state
    async fn toggle_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<bool>;

    async fn list_favorites(&self, character_id: CharacterId) -> Result<CharacterFavorites>;
}

pub struct ReferenceServiceImpl {
    catalog: Arc<ReferenceCatalog>,
    characters: Arc<dyn CharacterRepositoryPort>,
    favorites: Arc<dyn FavoritesRepositoryPort>,
}

impl ReferenceServiceImpl {
    pub fn new(catalog: Arc<ReferenceCatalog>, repositories: &Repositories) -> Self {
        Self {
            catalog,
            characters: repositories.characters.clone(),
            favorites: repositories.favorites.clone(),
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
}

fn kind_label(kind: FavoriteKind) -> &'static str {
    match kind {
        FavoriteKind::Spell => "Spell",
        FavoriteKind::Monster => "Monster",
        FavoriteKind::Feat => "Feat",
        FavoriteKind::Background => "Background",
        FavoriteKind::MagicItem => "Magic item",
    }
}

fn owned<T: Clone>(records: Vec<&T>) -> Vec<T> {
    records.into_iter().cloned().collect()
}

#[async_trait]
impl ReferenceService for ReferenceServiceImpl {
    fn search_spells(
        &self,
        name: Option<&str>,
        level: Option<u8>,
        class_name: Option<&str>,
    ) -> Vec<Spell> {
        owned(self.catalog.search_spells(name, level, class_name))
    }

    fn search_monsters(
        &self,
        name: Option<&str>,
        min_cr: Option<f32>,
        max_cr: Option<f32>,
    ) -> Vec<Monster> {
        owned(self.catalog.search_monsters(name, min_cr, max_cr))
    }

    fn search_feats(&self, name: Option<&str>) -> Vec<Feat> {
        owned(self.catalog.search_feats(name))
    }

    fn search_backgrounds(&self, name: Option<&str>) -> Vec<Background> {
        owned(self.catalog.search_backgrounds(name))
    }

    fn search_magic_items(&self, name: Option<&str>, rarity: Option<&str>) -> Vec<MagicItem> {
        owned(self.catalog.search_magic_items(name, rarity))
    }

    #[instrument(skip(self))]
    async fn toggle_favorite(
        &self,
        character_id: CharacterId,
        kind: FavoriteKind,
        item_id: &str,
    ) -> Result<bool> {
        self.ensure_character(character_id).await?;
        if !self.catalog.contains(kind, item_id) {
            return Err(not_found(kind_label(kind), item_id));
        }

        let favorite = !self
            .favorites
            .is_favorite(character_id, kind, item_id)
            .await
            .context("Failed to read favorite flag")?;
        self.favorites
            .set_favorite(character_id, kind, item_id, favorite)
            .await
            .context("Failed to store favorite flag")?;

        debug!(favorite, "Toggled favorite");
        Ok(favorite)
    }

    #[instrument(skip(self))]
    async fn list_favorites(&self, character_id: CharacterId) -> Result<CharacterFavorites> {
        self.ensure_character(character_id).await?;
        let favorites = self
            .favorites
            .list_for_character(character_id)
            .await
            .context("Failed to list favorites")?;

        let mut resolved = CharacterFavorites::default();
        for favorite in favorites {
            let id = favorite.item_id.as_str();
            match favorite.kind {
                FavoriteKind::Spell => resolved.spells.extend(self.catalog.spell(id).cloned()),
                FavoriteKind::Monster => {
                    resolved.monsters.extend(self.catalog.monster(id).cloned())
                }
                FavoriteKind::Feat => resolved
                    .feats
                    .extend(self.catalog.feats().iter().find(|f| f.id == id).cloned()),
                FavoriteKind::Background => resolved
                    .backgrounds
                    .extend(self.catalog.backgrounds().iter().find(|b| b.id == id).cloned()),
                FavoriteKind::MagicItem => resolved
                    .magic_items
                    .extend(self.catalog.magic_items().iter().find(|m| m.id == id).cloned()),
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Character;

    fn catalog() -> Arc<ReferenceCatalog> {
        let spells: Vec<Spell> = serde_json::from_str(
            r#"[
                {"name": "Fireball", "level": 3, "classes": ["Wizard", "Sorcerer"]},
                {"name": "Cure Wounds", "level": 1, "classes": ["Cleric"]}
            ]"#,
        )
        .unwrap();
        let monsters: Vec<Monster> = serde_json::from_str(
            r#"[{"name": "Goblin", "challengeRating": "1/4"}, {"name": "Owlbear", "challengeRating": "3"}]"#,
        )
        .unwrap();
        Arc::new(ReferenceCatalog::new(spells, vec![], vec![], monsters, vec![]))
    }

    async fn setup() -> (ReferenceServiceImpl, CharacterId) {
        let repositories = Repositories::in_memory();
        let character = Character::new("Caleb", "Human", "Wizard", "Sage", "Chaotic Good");
        repositories.characters.create(&character).await.unwrap();
        (ReferenceServiceImpl::new(catalog(), &repositories), character.id)
    }

    #[tokio::test]
    async fn test_searches() {
        let (service, _) = setup().await;
        assert_eq!(service.search_spells(None, None, Some("wizard")).len(), 1);
        assert_eq!(service.search_spells(Some("cure"), None, None).len(), 1);
        assert_eq!(service.search_monsters(None, Some(1.0), None)[0].name, "Owlbear");
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let (service, character_id) = setup().await;

        assert!(service
            .toggle_favorite(character_id, FavoriteKind::Spell, "fireball")
            .await
            .unwrap());
        service
            .toggle_favorite(character_id, FavoriteKind::Monster, "goblin")
            .await
            .unwrap();

        let favorites = service.list_favorites(character_id).await.unwrap();
        assert_eq!(favorites.spells[0].name, "Fireball");
        assert_eq!(favorites.monsters[0].name, "Goblin");

        assert!(!service
            .toggle_favorite(character_id, FavoriteKind::Spell, "fireball")
            .await
            .unwrap());
        assert!(service.list_favorites(character_id).await.unwrap().spells.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_items_and_characters() {
        let (service, character_id) = setup().await;
        let err = service
            .toggle_favorite(character_id, FavoriteKind::Feat, "lucky")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Feat not found"));

        assert!(service
            .toggle_favorite(CharacterId::new(), FavoriteKind::Spell, "fireball")
            .await
            .is_err());
    }
}
