//! External export - the Long Story Short character sheet schema
//!
//! The sheet wraps every value in a small object (`{value}` or
//! `{name, label, value}`) and ships the character document as a JSON
//! string inside an outer envelope. Narrative text has no home in this
//! schema and is dropped on export.

use std::collections::BTreeMap;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::domain::entities::{Character, ClassResource};
use crate::domain::value_objects::{ability_modifier, Ability, ProficiencyLevel, Skill};

use super::TransferError;

pub const EXTERNAL_JSON_TYPE: &str = "character";
pub const EXTERNAL_VERSION: &str = "2";

/// Sheet keys for the eighteen skills
const SKILL_KEYS: [(Skill, &str); 18] = [
    (Skill::Acrobatics, "acrobatics"),
    (Skill::Athletics, "athletics"),
    (Skill::SleightOfHand, "sleight of hand"),
    (Skill::Stealth, "stealth"),
    (Skill::Arcana, "arcana"),
    (Skill::History, "history"),
    (Skill::Investigation, "investigation"),
    (Skill::Nature, "nature"),
    (Skill::Religion, "religion"),
    (Skill::AnimalHandling, "animal handling"),
    (Skill::Insight, "insight"),
    (Skill::Medicine, "medicine"),
    (Skill::Perception, "perception"),
    (Skill::Survival, "survival"),
    (Skill::Deception, "deception"),
    (Skill::Intimidation, "intimidation"),
    (Skill::Performance, "performance"),
    (Skill::Persuasion, "persuasion"),
];

const COIN_KEYS: [&str; 5] = ["cp", "sp", "ep", "gp", "pp"];

/// Outer envelope of an external sheet file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCharacterFormat {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub disabled_blocks: Value,
    #[serde(default)]
    pub spells: Value,
    /// Written as an embedded JSON string; read from a string or an object
    #[serde(serialize_with = "data_as_string", deserialize_with = "data_from_string_or_object")]
    pub data: ExternalCharacterData,
    pub json_type: String,
    #[serde(default)]
    pub version: String,
}

/// The character document carried in the envelope's `data` member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCharacterData {
    pub name: ExternalText,
    pub info: ExternalInfo,
    #[serde(default)]
    pub stats: BTreeMap<String, ExternalStat>,
    #[serde(default)]
    pub saves: BTreeMap<String, ExternalSave>,
    #[serde(default)]
    pub skills: BTreeMap<String, ExternalSkill>,
    #[serde(default)]
    pub vitality: ExternalVitality,
    #[serde(default)]
    pub coins: BTreeMap<String, ExternalNumber>,
    #[serde(default)]
    pub resources: BTreeMap<String, ExternalResource>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub proficiency: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalText {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalNumber {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub value: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabeledText {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabeledNumber {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub value: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalInfo {
    pub char_class: LabeledText,
    #[serde(default)]
    pub char_subclass: LabeledText,
    #[serde(default)]
    pub level: LabeledNumber,
    #[serde(default)]
    pub background: LabeledText,
    #[serde(default)]
    pub race: LabeledText,
    #[serde(default)]
    pub alignment: LabeledText,
    #[serde(default)]
    pub experience: LabeledNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalStat {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub score: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub modifier: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSave {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub is_prof: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSkill {
    #[serde(default)]
    pub base_stat: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// 0 untrained, 1 proficient, 2 expertise
    #[serde(default, deserialize_with = "lenient_i32")]
    pub is_prof: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalVitality {
    #[serde(rename = "hp-max", default)]
    pub hp_max: ExternalNumber,
    #[serde(rename = "hp-current", default)]
    pub hp_current: ExternalNumber,
    #[serde(rename = "hp-temp", default)]
    pub hp_temp: ExternalNumber,
    #[serde(default)]
    pub ac: ExternalNumber,
    #[serde(default)]
    pub speed: ExternalNumber,
    #[serde(default)]
    pub initiative: ExternalNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub current: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub max: i32,
}

/// Build the external sheet document for a character. Unlike the other
/// exports there is no retry: the avatar is never part of this schema.
pub fn export_external(character: &Character) -> Result<String, TransferError> {
    let envelope = ExternalCharacterFormat {
        tags: Vec::new(),
        disabled_blocks: Value::Object(Default::default()),
        spells: serde_json::json!({ "mode": "cards", "prepared": [], "book": [] }),
        data: ExternalCharacterData::from_character(character),
        json_type: EXTERNAL_JSON_TYPE.to_string(),
        version: EXTERNAL_VERSION.to_string(),
    };
    serde_json::to_string_pretty(&envelope).map_err(TransferError::Encode)
}

impl ExternalCharacterData {
    pub fn from_character(character: &Character) -> Self {
        let stats = Ability::ALL
            .into_iter()
            .map(|ability| {
                let score = character.ability_score(ability);
                (
                    ability.abbreviation().to_string(),
                    ExternalStat {
                        name: ability.abbreviation().to_string(),
                        label: ability.display_name().to_string(),
                        score,
                        modifier: ability_modifier(score),
                    },
                )
            })
            .collect();

        let saves = Ability::ALL
            .into_iter()
            .map(|ability| {
                (
                    ability.abbreviation().to_string(),
                    ExternalSave {
                        name: ability.abbreviation().to_string(),
                        is_prof: i32::from(character.has_saving_throw_proficiency(ability)),
                    },
                )
            })
            .collect();

        let skills = SKILL_KEYS
            .iter()
            .map(|(skill, key)| {
                (
                    key.to_string(),
                    ExternalSkill {
                        base_stat: skill.ability().abbreviation().to_string(),
                        name: key.to_string(),
                        label: skill.display_name().to_string(),
                        is_prof: character.skill_proficiency(*skill).multiplier(),
                    },
                )
            })
            .collect();

        let currency = &character.currency;
        let coin_values = [
            currency.copper,
            currency.silver,
            currency.electrum,
            currency.gold,
            currency.platinum,
        ];
        let coins = COIN_KEYS
            .iter()
            .zip(coin_values)
            .map(|(key, value)| {
                (
                    key.to_string(),
                    ExternalNumber {
                        value: i32::try_from(value).unwrap_or(i32::MAX),
                    },
                )
            })
            .collect();

        let resources = character
            .class_resources
            .iter()
            .map(|(name, resource)| {
                (
                    name.clone(),
                    ExternalResource {
                        id: name.clone(),
                        name: name.clone(),
                        current: resource.current,
                        max: resource.max,
                    },
                )
            })
            .collect();

        Self {
            name: ExternalText {
                value: character.name.clone(),
            },
            info: ExternalInfo {
                char_class: labeled_text("charClass", "Class", &character.character_class),
                char_subclass: labeled_text(
                    "charSubclass",
                    "Subclass",
                    character.subclass.as_deref().unwrap_or_default(),
                ),
                level: labeled_number("level", "Level", character.level() as i32),
                background: labeled_text("background", "Background", &character.background),
                race: labeled_text("race", "Race", &character.race),
                alignment: labeled_text("alignment", "Alignment", &character.alignment),
                experience: labeled_number(
                    "experience",
                    "Experience",
                    i32::try_from(character.experience_points).unwrap_or(i32::MAX),
                ),
            },
            stats,
            saves,
            skills,
            vitality: ExternalVitality {
                hp_max: number(character.max_hit_points()),
                hp_current: number(character.hit_points()),
                hp_temp: number(character.temporary_hit_points),
                ac: number(character.armor_class),
                speed: number(character.speed),
                initiative: number(character.initiative),
            },
            coins,
            resources,
            proficiency: character.proficiency_bonus,
        }
    }

    /// Rebuild a character from the sheet. Fields the schema does not carry
    /// keep their defaults.
    pub fn into_character(self) -> Result<Character, String> {
        let name = self.name.value.trim();
        if name.is_empty() {
            return Err("character name is empty".to_string());
        }
        let class = self.info.char_class.value.trim();
        if class.is_empty() {
            return Err("character class is empty".to_string());
        }

        let mut character = Character::new(
            name,
            self.info.race.value.trim(),
            class,
            self.info.background.value.trim(),
            self.info.alignment.value.trim(),
        );

        let subclass = self.info.char_subclass.value.trim();
        if !subclass.is_empty() {
            character.subclass = Some(subclass.to_string());
        }
        character.set_level(self.info.level.value.max(0) as u32);
        character.experience_points = self.info.experience.value.max(0) as u32;

        for ability in Ability::ALL {
            if let Some(stat) = self.stats.get(ability.abbreviation()) {
                character.set_ability_score(ability, stat.score);
            }
            if let Some(save) = self.saves.get(ability.abbreviation()) {
                character.set_saving_throw_proficiency(ability, save.is_prof > 0);
            }
        }

        for (skill, key) in SKILL_KEYS {
            if let Some(entry) = self.skills.get(key) {
                let level = match entry.is_prof {
                    i32::MIN..=0 => ProficiencyLevel::None,
                    1 => ProficiencyLevel::Proficient,
                    _ => ProficiencyLevel::Expertise,
                };
                character.set_skill_proficiency(skill, level);
            }
        }

        let vitality = &self.vitality;
        if vitality.hp_max.value > 0 {
            character.set_max_hit_points(vitality.hp_max.value);
            character.set_hit_points(vitality.hp_current.value);
        }
        character.temporary_hit_points = vitality.hp_temp.value.max(0);
        if vitality.ac.value > 0 {
            character.armor_class = vitality.ac.value;
        }
        if vitality.speed.value > 0 {
            character.speed = vitality.speed.value;
        }
        character.initiative = vitality.initiative.value;

        for key in COIN_KEYS {
            let amount = self.coins.get(key).map_or(0, |c| c.value.max(0) as u32);
            let currency = &mut character.currency;
            match key {
                "cp" => currency.copper = amount,
                "sp" => currency.silver = amount,
                "ep" => currency.electrum = amount,
                "gp" => currency.gold = amount,
                _ => currency.platinum = amount,
            }
        }

        for (key, resource) in self.resources {
            let name = if resource.name.trim().is_empty() {
                key
            } else {
                resource.name
            };
            character
                .class_resources
                .insert(name, ClassResource::with_current(resource.current, resource.max));
        }

        if self.proficiency > 0 {
            character.proficiency_bonus = self.proficiency;
        }
        Ok(character)
    }
}

fn labeled_text(name: &str, label: &str, value: &str) -> LabeledText {
    LabeledText {
        name: name.to_string(),
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn labeled_number(name: &str, label: &str, value: i32) -> LabeledNumber {
    LabeledNumber {
        name: name.to_string(),
        label: label.to_string(),
        value,
    }
}

fn number(value: i32) -> ExternalNumber {
    ExternalNumber { value }
}

/// Read an integer from a number, numeric string or boolean
pub(super) fn number_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .map(|n| n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .unwrap_or_default())
}

fn data_as_string<S: Serializer>(
    data: &ExternalCharacterData,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let encoded = serde_json::to_string(data).map_err(ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

fn data_from_string_or_object<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ExternalCharacterData, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(encoded) => serde_json::from_str(&encoded).map_err(de::Error::custom),
        value @ Value::Object(_) => serde_json::from_value(value).map_err(de::Error::custom),
        _ => Err(de::Error::custom("character data must be a string or an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AbilityScores;

    fn rogue() -> Character {
        let mut character = Character::new("Vex", "Halfling", "Rogue", "Criminal", "Chaotic Neutral")
            .with_subclass("Thief")
            .with_level(4)
            .with_abilities(AbilityScores::new(8, 17, 12, 13, 10, 14))
            .with_hit_points(20, 27);
        character.set_skill_proficiency(Skill::Stealth, ProficiencyLevel::Expertise);
        character.set_skill_proficiency(Skill::SleightOfHand, ProficiencyLevel::Proficient);
        character.set_saving_throw_proficiency(Ability::Dexterity, true);
        character.currency.gold = 42;
        character.personality_traits = "Never sits with back to the door".to_string();
        character
    }

    #[test]
    fn test_export_external_embeds_data_as_string() {
        let json = export_external(&rogue()).unwrap();
        let envelope: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(envelope["jsonType"], "character");
        assert_eq!(envelope["version"], "2");
        let data: Value = serde_json::from_str(envelope["data"].as_str().unwrap()).unwrap();
        assert_eq!(data["name"]["value"], "Vex");
        assert_eq!(data["info"]["charClass"]["value"], "Rogue");
        assert_eq!(data["info"]["level"]["value"], 4);
        assert_eq!(data["stats"]["dex"]["score"], 17);
        assert_eq!(data["stats"]["dex"]["modifier"], 3);
        assert_eq!(data["saves"]["dex"]["isProf"], 1);
        assert_eq!(data["skills"]["stealth"]["isProf"], 2);
        assert_eq!(data["skills"]["sleight of hand"]["isProf"], 1);
        assert_eq!(data["skills"]["animal handling"]["baseStat"], "wis");
        assert_eq!(data["coins"]["gp"]["value"], 42);
        assert_eq!(data["vitality"]["hp-max"]["value"], 27);
        assert!(!json.contains("Never sits"));
    }

    #[test]
    fn test_sheet_round_trips_core_fields() {
        let json = export_external(&rogue()).unwrap();
        let envelope: ExternalCharacterFormat = serde_json::from_str(&json).unwrap();
        let character = envelope.data.into_character().unwrap();

        assert_eq!(character.race, "Halfling");
        assert_eq!(character.subclass.as_deref(), Some("Thief"));
        assert_eq!(character.level(), 4);
        assert_eq!(character.ability_score(Ability::Dexterity), 17);
        assert_eq!(character.skill_proficiency(Skill::Stealth), ProficiencyLevel::Expertise);
        assert!(character.has_saving_throw_proficiency(Ability::Dexterity));
        assert_eq!(character.hit_points(), 20);
        assert_eq!(character.currency.gold, 42);
    }

    #[test]
    fn test_data_may_be_an_object_with_loose_numbers() {
        let json = r#"{
            "jsonType": "character",
            "data": {
                "name": {"value": "Oona"},
                "info": {
                    "charClass": {"value": "Druid"},
                    "level": {"value": "3"},
                    "race": {"value": "Gnome"}
                },
                "stats": {"wis": {"score": "16"}}
            }
        }"#;
        let envelope: ExternalCharacterFormat = serde_json::from_str(json).unwrap();
        let character = envelope.data.into_character().unwrap();
        assert_eq!(character.level(), 3);
        assert_eq!(character.ability_score(Ability::Wisdom), 16);
        assert_eq!(character.ability_score(Ability::Strength), 10);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let json = r#"{"jsonType": "character", "data": {"name": {"value": " "}, "info": {"charClass": {"value": "Bard"}}}}"#;
        let envelope: ExternalCharacterFormat = serde_json::from_str(json).unwrap();
        assert!(envelope.data.into_character().is_err());
    }
}
