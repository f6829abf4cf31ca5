//! Character Service - Application service for character sheets
//!
//! Covers creation and editing of the sheet itself plus the table-side
//! actions a player takes during a session: taking damage, healing,
//! spending class resources, resting and levelling into new classes.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{
    CharacterRepositoryPort, FavoritesRepositoryPort, NoteRepositoryPort,
    RelationshipRepositoryPort,
};
use crate::application::services::{invalid, not_found, validate_text};
use crate::domain::entities::{AbilityScores, Character, ClassEntry, Currency, MAX_LEVEL};
use crate::domain::value_objects::{Ability, Avatar, CharacterId, ProficiencyLevel, Skill};
use crate::infrastructure::persistence::Repositories;

const MAX_NAME_LEN: usize = 255;
const MAX_NARRATIVE_LEN: usize = 10_000;

/// Request to create a new character
#[derive(Debug, Clone, Default)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub race: String,
    pub character_class: String,
    pub subclass: Option<String>,
    pub background: String,
    pub alignment: String,
    pub level: Option<u32>,
    pub abilities: Option<AbilityScores>,
    pub max_hit_points: Option<i32>,
    pub armor_class: Option<i32>,
    pub speed: Option<i32>,
    pub avatar: Option<Avatar>,
}

/// Partial update of a character; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub race: Option<String>,
    pub character_class: Option<String>,
    /// An empty string clears the subclass
    pub subclass: Option<String>,
    pub background: Option<String>,
    pub alignment: Option<String>,
    pub level: Option<u32>,
    pub experience_points: Option<u32>,
    pub armor_class: Option<i32>,
    pub initiative: Option<i32>,
    pub speed: Option<i32>,
    pub max_hit_points: Option<i32>,
    pub temporary_hit_points: Option<i32>,
    pub personality_traits: Option<String>,
    pub ideals: Option<String>,
    pub bonds: Option<String>,
    pub flaws: Option<String>,
    pub features_and_traits: Option<String>,
    pub proficiencies_and_languages: Option<String>,
    pub equipment: Option<Vec<String>>,
    pub treasure: Option<Vec<String>>,
    pub avatar: Option<Avatar>,
    pub remove_avatar: bool,
}

/// Character service trait defining the application use cases
#[async_trait]
pub trait CharacterService: Send + Sync {
    async fn create_character(&self, request: CreateCharacterRequest) -> Result<Character>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>>;

    async fn list_characters(&self) -> Result<Vec<Character>>;

    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequest,
    ) -> Result<Character>;

    /// Delete a character together with its relationships, notes and favorites
    async fn delete_character(&self, id: CharacterId) -> Result<()>;

    /// Set current hit points, and optionally the maximum first
    async fn set_hit_points(
        &self,
        id: CharacterId,
        current: i32,
        max: Option<i32>,
    ) -> Result<Character>;

    async fn apply_damage(&self, id: CharacterId, amount: i32) -> Result<Character>;

    async fn heal(&self, id: CharacterId, amount: i32) -> Result<Character>;

    async fn long_rest(&self, id: CharacterId) -> Result<Character>;

    async fn set_ability_score(
        &self,
        id: CharacterId,
        ability: Ability,
        score: i32,
    ) -> Result<Character>;

    async fn set_skill_proficiency(
        &self,
        id: CharacterId,
        skill: Skill,
        level: ProficiencyLevel,
    ) -> Result<Character>;

    async fn set_saving_throw_proficiency(
        &self,
        id: CharacterId,
        ability: Ability,
        proficient: bool,
    ) -> Result<Character>;

    async fn update_currency(&self, id: CharacterId, currency: Currency) -> Result<Character>;

    async fn set_class_resource(
        &self,
        id: CharacterId,
        name: &str,
        current: i32,
        max: i32,
    ) -> Result<Character>;

    /// Spend uses of a class resource; fails if not enough remain
    async fn use_class_resource(&self, id: CharacterId, name: &str, amount: i32)
        -> Result<Character>;

    /// Refill one class resource to its maximum
    async fn restore_class_resource(&self, id: CharacterId, name: &str) -> Result<Character>;

    /// Add a class (or raise an existing one) on a multiclass character
    async fn add_class_entry(&self, id: CharacterId, entry: ClassEntry) -> Result<Character>;

    /// Start tracking per-class levels for a single-class character
    async fn migrate_classes(&self, id: CharacterId) -> Result<Character>;
}

/// Default implementation of CharacterService over the repository ports
pub struct CharacterServiceImpl {
    characters: Arc<dyn CharacterRepositoryPort>,
    relationships: Arc<dyn RelationshipRepositoryPort>,
    notes: Arc<dyn NoteRepositoryPort>,
    favorites: Arc<dyn FavoritesRepositoryPort>,
}

impl CharacterServiceImpl {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            characters: repositories.characters.clone(),
            relationships: repositories.relationships.clone(),
            notes: repositories.notes.clone(),
            favorites: repositories.favorites.clone(),
        }
    }

    fn validate_create_request(request: &CreateCharacterRequest) -> Result<()> {
        validate_text("Character name", &request.name, MAX_NAME_LEN)?;
        validate_text("Race", &request.race, MAX_NAME_LEN)?;
        validate_text("Class", &request.character_class, MAX_NAME_LEN)?;
        if let Some(avatar) = &request.avatar {
            validate_avatar(avatar)?;
        }
        Ok(())
    }

    fn validate_update_request(request: &UpdateCharacterRequest) -> Result<()> {
        if let Some(ref name) = request.name {
            validate_text("Character name", name, MAX_NAME_LEN)?;
        }
        if let Some(ref race) = request.race {
            validate_text("Race", race, MAX_NAME_LEN)?;
        }
        if let Some(ref class) = request.character_class {
            validate_text("Class", class, MAX_NAME_LEN)?;
        }
        let narrative = [
            &request.personality_traits,
            &request.ideals,
            &request.bonds,
            &request.flaws,
            &request.features_and_traits,
            &request.proficiencies_and_languages,
        ];
        if narrative
            .iter()
            .any(|text| text.as_ref().is_some_and(|t| t.len() > MAX_NARRATIVE_LEN))
        {
            return Err(invalid(format!(
                "Narrative text cannot exceed {} characters",
                MAX_NARRATIVE_LEN
            )));
        }
        if let Some(avatar) = &request.avatar {
            validate_avatar(avatar)?;
        }
        Ok(())
    }

    async fn load(&self, id: CharacterId) -> Result<Character> {
        self.characters
            .get(id)
            .await
            .context("Failed to get character from repository")?
            .ok_or_else(|| not_found("Character", id))
    }

    /// Apply `change` and stamp the character under the repository's write lock
    async fn modify<'a, F>(&self, id: CharacterId, change: F) -> Result<Character>
    where
        F: FnOnce(&mut Character) -> Result<()> + Send + 'a,
    {
        self.characters
            .modify(
                id,
                Box::new(move |character: &mut Character| -> Result<()> {
                    change(character)?;
                    character.touch();
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| not_found("Character", id))
    }
}

fn validate_avatar(avatar: &Avatar) -> Result<()> {
    if avatar.format().is_none() {
        return Err(invalid("Avatar must be a PNG, JPEG, GIF or WebP image"));
    }
    Ok(())
}

#[async_trait]
impl CharacterService for CharacterServiceImpl {
    #[instrument(skip(self, request), fields(name = %request.name, class = %request.character_class))]
    async fn create_character(&self, request: CreateCharacterRequest) -> Result<Character> {
        Self::validate_create_request(&request)?;

        let mut character = Character::new(
            request.name.trim(),
            request.race.trim(),
            request.character_class.trim(),
            request.background.trim(),
            request.alignment.trim(),
        );
        if let Some(subclass) = request.subclass.filter(|s| !s.trim().is_empty()) {
            character = character.with_subclass(subclass);
        }
        if let Some(level) = request.level {
            character = character.with_level(level);
        }
        if let Some(abilities) = request.abilities {
            character = character.with_abilities(abilities);
        }
        if let Some(max) = request.max_hit_points {
            character = character.with_hit_points(max, max);
        }
        if let Some(armor_class) = request.armor_class {
            character.armor_class = armor_class;
        }
        if let Some(speed) = request.speed {
            character.speed = speed;
        }
        character.avatar = request.avatar;

        self.characters
            .create(&character)
            .await
            .context("Failed to create character in repository")?;

        info!(
            character_id = %character.id,
            level = character.level(),
            "Created character: {}",
            character.name
        );
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>> {
        debug!(character_id = %id, "Fetching character");
        self.characters
            .get(id)
            .await
            .context("Failed to get character from repository")
    }

    #[instrument(skip(self))]
    async fn list_characters(&self) -> Result<Vec<Character>> {
        self.characters
            .list()
            .await
            .context("Failed to list characters from repository")
    }

    #[instrument(skip(self, request), fields(character_id = %id))]
    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequest,
    ) -> Result<Character> {
        Self::validate_update_request(&request)?;

        let character = self
            .modify(id, |character| {
                if request.level.is_some() && character.classes.is_some() {
                    return Err(invalid(
                        "Level follows the class entries once multiclass tracking is enabled",
                    ));
                }

                if let Some(name) = request.name {
                    character.name = name.trim().to_string();
                }
                if let Some(race) = request.race {
                    character.race = race.trim().to_string();
                }
                if let Some(class) = request.character_class {
                    character.character_class = class.trim().to_string();
                }
                if let Some(subclass) = request.subclass {
                    let subclass = subclass.trim();
                    character.subclass = (!subclass.is_empty()).then(|| subclass.to_string());
                }
                if let Some(background) = request.background {
                    character.background = background;
                }
                if let Some(alignment) = request.alignment {
                    character.alignment = alignment;
                }
                if let Some(level) = request.level {
                    character.set_level(level);
                }
                if let Some(xp) = request.experience_points {
                    character.experience_points = xp;
                }
                if let Some(armor_class) = request.armor_class {
                    character.armor_class = armor_class;
                }
                if let Some(initiative) = request.initiative {
                    character.initiative = initiative;
                }
                if let Some(speed) = request.speed {
                    character.speed = speed;
                }
                if let Some(max) = request.max_hit_points {
                    character.set_max_hit_points(max);
                }
                if let Some(temp) = request.temporary_hit_points {
                    character.temporary_hit_points = temp.max(0);
                }
                if let Some(text) = request.personality_traits {
                    character.personality_traits = text;
                }
                if let Some(text) = request.ideals {
                    character.ideals = text;
                }
                if let Some(text) = request.bonds {
                    character.bonds = text;
                }
                if let Some(text) = request.flaws {
                    character.flaws = text;
                }
                if let Some(text) = request.features_and_traits {
                    character.features_and_traits = text;
                }
                if let Some(text) = request.proficiencies_and_languages {
                    character.proficiencies_and_languages = text;
                }
                if let Some(equipment) = request.equipment {
                    character.equipment = equipment;
                }
                if let Some(treasure) = request.treasure {
                    character.treasure = treasure;
                }
                if request.remove_avatar {
                    character.avatar = None;
                } else if request.avatar.is_some() {
                    character.avatar = request.avatar;
                }
                Ok(())
            })
            .await?;

        info!(character_id = %id, "Updated character: {}", character.name);
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn delete_character(&self, id: CharacterId) -> Result<()> {
        let character = self.load(id).await?;

        let relationships = self
            .relationships
            .delete_by_character(id)
            .await
            .context("Failed to delete character relationships")?;
        let notes = self
            .notes
            .delete_by_character(id)
            .await
            .context("Failed to delete character notes")?;
        let favorites = self
            .favorites
            .clear_character(id)
            .await
            .context("Failed to clear character favorites")?;
        self.characters
            .delete(id)
            .await
            .context("Failed to delete character from repository")?;

        info!(
            character_id = %id,
            relationships,
            notes,
            favorites,
            "Deleted character: {}",
            character.name
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_hit_points(
        &self,
        id: CharacterId,
        current: i32,
        max: Option<i32>,
    ) -> Result<Character> {
        self.modify(id, |character| {
            if let Some(max) = max {
                character.set_max_hit_points(max);
            }
            character.set_hit_points(current);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn apply_damage(&self, id: CharacterId, amount: i32) -> Result<Character> {
        if amount < 0 {
            return Err(invalid("Damage cannot be negative"));
        }
        let character = self
            .modify(id, |character| {
                character.apply_damage(amount);
                Ok(())
            })
            .await?;
        if character.is_unconscious() {
            info!(character_id = %id, "{} dropped to 0 hit points", character.name);
        }
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn heal(&self, id: CharacterId, amount: i32) -> Result<Character> {
        if amount < 0 {
            return Err(invalid("Healing cannot be negative"));
        }
        self.modify(id, |character| {
            character.heal(amount);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn long_rest(&self, id: CharacterId) -> Result<Character> {
        let character = self
            .modify(id, |character| {
                character.long_rest();
                Ok(())
            })
            .await?;
        debug!(character_id = %id, "Long rest completed");
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn set_ability_score(
        &self,
        id: CharacterId,
        ability: Ability,
        score: i32,
    ) -> Result<Character> {
        self.modify(id, |character| {
            character.set_ability_score(ability, score);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_skill_proficiency(
        &self,
        id: CharacterId,
        skill: Skill,
        level: ProficiencyLevel,
    ) -> Result<Character> {
        self.modify(id, |character| {
            character.set_skill_proficiency(skill, level);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_saving_throw_proficiency(
        &self,
        id: CharacterId,
        ability: Ability,
        proficient: bool,
    ) -> Result<Character> {
        self.modify(id, |character| {
            character.set_saving_throw_proficiency(ability, proficient);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, currency))]
    async fn update_currency(&self, id: CharacterId, currency: Currency) -> Result<Character> {
        self.modify(id, |character| {
            character.currency = currency;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_class_resource(
        &self,
        id: CharacterId,
        name: &str,
        current: i32,
        max: i32,
    ) -> Result<Character> {
        validate_text("Resource name", name, MAX_NAME_LEN)?;
        self.modify(id, |character| {
            character.set_class_resource(name.trim(), current, max);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn use_class_resource(
        &self,
        id: CharacterId,
        name: &str,
        amount: i32,
    ) -> Result<Character> {
        self.modify(id, |character| {
            if !character.class_resources.contains_key(name) {
                return Err(not_found("Class resource", name));
            }
            if !character.use_class_resource(name, amount) {
                return Err(invalid(format!("Not enough {} remaining", name)));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn restore_class_resource(&self, id: CharacterId, name: &str) -> Result<Character> {
        self.modify(id, |character| {
            let resource = character
                .class_resources
                .get_mut(name)
                .ok_or_else(|| not_found("Class resource", name))?;
            resource.restore();
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, entry), fields(class = %entry.name, class_level = entry.level))]
    async fn add_class_entry(&self, id: CharacterId, entry: ClassEntry) -> Result<Character> {
        validate_text("Class", &entry.name, MAX_NAME_LEN)?;
        if entry.level > MAX_LEVEL {
            return Err(invalid("Class level cannot exceed 20"));
        }
        let character = self
            .modify(id, |character| {
                let current: u32 = character
                    .total_class_level()
                    .unwrap_or_else(|| character.level());
                let existing = character
                    .classes
                    .iter()
                    .flatten()
                    .find(|c| c.name.eq_ignore_ascii_case(&entry.name))
                    .map_or(0, |c| c.level);
                let total = current
                    .saturating_sub(existing)
                    .saturating_add(entry.level.max(1));
                if total > MAX_LEVEL {
                    return Err(invalid("Total character level cannot exceed 20"));
                }
                character.add_class_entry(entry);
                Ok(())
            })
            .await?;

        info!(
            character_id = %id,
            level = character.level(),
            "Updated classes for character: {}",
            character.name
        );
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn migrate_classes(&self, id: CharacterId) -> Result<Character> {
        self.modify(id, |character| {
            if character.migrate_classes() {
                debug!("Migrated single class to class entries");
            }
            Ok(())
        })
        .await
    }
}
