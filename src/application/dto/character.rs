use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::services::{CreateCharacterRequest, UpdateCharacterRequest};
use crate::domain::entities::{AbilityScores, Character};
use crate::domain::value_objects::{Ability, Avatar, ProficiencyLevel, Skill};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequestDto {
    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default, alias = "class")]
    pub character_class: String,
    #[serde(default)]
    pub subclass: Option<String>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub alignment: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub abilities: Option<AbilityScores>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub speed: Option<i32>,
    /// Base64 image
    #[serde(default)]
    pub avatar: Option<Avatar>,
}

impl From<CreateCharacterRequestDto> for CreateCharacterRequest {
    fn from(dto: CreateCharacterRequestDto) -> Self {
        Self {
            name: dto.name,
            race: dto.race,
            character_class: dto.character_class,
            subclass: dto.subclass,
            background: dto.background,
            alignment: dto.alignment,
            level: dto.level,
            abilities: dto.abilities,
            max_hit_points: dto.max_hit_points,
            armor_class: dto.armor_class,
            speed: dto.speed,
            avatar: dto.avatar,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCharacterRequestDto {
    pub name: Option<String>,
    pub race: Option<String>,
    #[serde(alias = "class")]
    pub character_class: Option<String>,
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

impl From<UpdateCharacterRequestDto> for UpdateCharacterRequest {
    fn from(dto: UpdateCharacterRequestDto) -> Self {
        Self {
            name: dto.name,
            race: dto.race,
            character_class: dto.character_class,
            subclass: dto.subclass,
            background: dto.background,
            alignment: dto.alignment,
            level: dto.level,
            experience_points: dto.experience_points,
            armor_class: dto.armor_class,
            initiative: dto.initiative,
            speed: dto.speed,
            max_hit_points: dto.max_hit_points,
            temporary_hit_points: dto.temporary_hit_points,
            personality_traits: dto.personality_traits,
            ideals: dto.ideals,
            bonds: dto.bonds,
            flaws: dto.flaws,
            features_and_traits: dto.features_and_traits,
            proficiencies_and_languages: dto.proficiencies_and_languages,
            equipment: dto.equipment,
            treasure: dto.treasure,
            avatar: dto.avatar,
            remove_avatar: dto.remove_avatar,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HitPointsRequestDto {
    pub current: i32,
    #[serde(default)]
    pub max: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequestDto {
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct AbilityScoreRequestDto {
    pub score: i32,
}

#[derive(Debug, Deserialize)]
pub struct SkillProficiencyRequestDto {
    pub level: ProficiencyLevel,
}

#[derive(Debug, Deserialize)]
pub struct SavingThrowRequestDto {
    pub proficient: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClassResourceRequestDto {
    /// Defaults to a full resource
    #[serde(default)]
    pub current: Option<i32>,
    pub max: i32,
}

#[derive(Debug, Deserialize)]
pub struct UseResourceRequestDto {
    #[serde(default = "default_use_amount")]
    pub amount: i32,
}

fn default_use_amount() -> i32 {
    1
}

/// A character sheet with its derived numbers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResponseDto {
    #[serde(flatten)]
    pub character: Character,
    pub ability_modifiers: BTreeMap<Ability, i32>,
    pub saving_throws: BTreeMap<Ability, i32>,
    pub skills: BTreeMap<Skill, i32>,
    pub passive_perception: i32,
    pub is_unconscious: bool,
}

impl From<Character> for CharacterResponseDto {
    fn from(character: Character) -> Self {
        let ability_modifiers = Ability::ALL
            .into_iter()
            .map(|a| (a, character.ability_modifier(a)))
            .collect();
        let saving_throws = Ability::ALL
            .into_iter()
            .map(|a| (a, character.saving_throw_modifier(a)))
            .collect();
        let skills = Skill::ALL
            .into_iter()
            .map(|s| (s, character.skill_modifier(s)))
            .collect();
        Self {
            ability_modifiers,
            saving_throws,
            skills,
            passive_perception: character.passive_perception(),
            is_unconscious: character.is_unconscious(),
            character,
        }
    }
}
