//! Import of character documents in any supported shape
//!
//! There is no format tag to dispatch on, so each known shape is tried in a
//! fixed order and the first one that parses wins. Imported records always
//! receive fresh identities.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entities::{Character, Monster, Note, Relationship, Spell};
use crate::domain::value_objects::{Ability, CharacterId, NoteId, RelationshipId};

use super::external::{number_from_value, EXTERNAL_JSON_TYPE};
use super::{ExtendedCharacterExport, ExternalCharacterFormat, ImportFormat, TransferError};

/// Why one import strategy rejected a document
#[derive(Debug, Clone, Serialize)]
pub struct StrategyFailure {
    pub format: ImportFormat,
    pub reason: String,
}

/// A character recovered from an import, with anything bundled alongside it
#[derive(Debug, Clone)]
pub struct ImportedCharacter {
    pub format: ImportFormat,
    pub character: Character,
    pub relationships: Vec<Relationship>,
    pub notes: Vec<Note>,
    pub favorite_spells: Vec<Spell>,
    pub favorite_monsters: Vec<Monster>,
}

struct ParsedDocument {
    character: Character,
    relationships: Vec<Relationship>,
    notes: Vec<Note>,
    favorite_spells: Vec<Spell>,
    favorite_monsters: Vec<Monster>,
}

impl ParsedDocument {
    fn character_only(character: Character) -> Self {
        Self {
            character,
            relationships: Vec::new(),
            notes: Vec::new(),
            favorite_spells: Vec::new(),
            favorite_monsters: Vec::new(),
        }
    }
}

type ParseStrategy = fn(&str) -> Result<ParsedDocument, String>;

/// Tried in order; the first success wins
const STRATEGIES: [(ImportFormat, ParseStrategy); 4] = [
    (ImportFormat::External, parse_external),
    (ImportFormat::Extended, parse_extended),
    (ImportFormat::Basic, parse_basic),
    (ImportFormat::Manual, parse_manual),
];

/// Import a character document of any supported shape.
///
/// Fails only when every strategy rejects the document; the error lists
/// each strategy's reason.
pub fn import_any(json: &str) -> Result<ImportedCharacter, TransferError> {
    let mut failures = Vec::new();
    for (format, parse) in STRATEGIES {
        match parse(json) {
            Ok(document) => {
                let imported = restamp(format, document);
                tracing::info!(
                    format = %format,
                    character_id = %imported.character.id,
                    relationships = imported.relationships.len(),
                    notes = imported.notes.len(),
                    "Character document imported"
                );
                return Ok(imported);
            }
            Err(reason) => {
                tracing::debug!(format = %format, reason = %reason, "Import strategy rejected document");
                failures.push(StrategyFailure { format, reason });
            }
        }
    }
    Err(TransferError::Unrecognized(failures))
}

/// Give every imported record a fresh identity and reset its timestamps
fn restamp(format: ImportFormat, document: ParsedDocument) -> ImportedCharacter {
    let now = Utc::now();
    let mut character = document.character;
    character.id = CharacterId::new();
    character.created_at = now;
    character.updated_at = now;
    character.normalize();
    if character.avatar.as_ref().is_some_and(|a| a.format().is_none()) {
        tracing::warn!(character_id = %character.id, "Dropping unrecognized avatar from import");
        character.avatar = None;
    }

    let relationships = document
        .relationships
        .into_iter()
        .map(|mut relationship| {
            relationship.id = RelationshipId::new();
            relationship.character_id = character.id;
            relationship.created_at = now;
            relationship.updated_at = now;
            relationship.normalize();
            relationship
        })
        .collect();

    let notes = document
        .notes
        .into_iter()
        .map(|mut note| {
            note.id = NoteId::new();
            note.character_id = character.id;
            note.created_at = now;
            note.updated_at = now;
            note
        })
        .collect();

    ImportedCharacter {
        format,
        character,
        relationships,
        notes,
        favorite_spells: document.favorite_spells,
        favorite_monsters: document.favorite_monsters,
    }
}

fn parse_external(json: &str) -> Result<ParsedDocument, String> {
    let envelope: ExternalCharacterFormat =
        serde_json::from_str(json).map_err(|e| e.to_string())?;
    if envelope.json_type != EXTERNAL_JSON_TYPE {
        return Err(format!("unsupported jsonType {:?}", envelope.json_type));
    }
    envelope
        .data
        .into_character()
        .map(ParsedDocument::character_only)
}

fn parse_extended(json: &str) -> Result<ParsedDocument, String> {
    let bundle: ExtendedCharacterExport = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(ParsedDocument {
        character: bundle.character,
        relationships: bundle.relationships,
        notes: bundle.notes,
        favorite_spells: bundle.favorite_spells,
        favorite_monsters: bundle.favorite_monsters,
    })
}

fn parse_basic(json: &str) -> Result<ParsedDocument, String> {
    serde_json::from_str::<Character>(json)
        .map(ParsedDocument::character_only)
        .map_err(|e| e.to_string())
}

const CLASS_KEYS: [&str; 3] = ["characterClass", "class", "character_class"];

/// Best-effort extraction from a loosely shaped object. Requires name, race,
/// class, background and alignment; everything else is optional.
fn parse_manual(json: &str) -> Result<ParsedDocument, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let root = value
        .as_object()
        .ok_or_else(|| "document is not a JSON object".to_string())?;
    let object = root
        .get("character")
        .and_then(Value::as_object)
        .unwrap_or(root);

    let name = text(object, &["name"]);
    let race = text(object, &["race"]);
    let class = text(object, &CLASS_KEYS);
    let background = text(object, &["background"]);
    let alignment = text(object, &["alignment"]);

    let (Some(name), Some(race), Some(class), Some(background), Some(alignment)) =
        (&name, &race, &class, &background, &alignment)
    else {
        let missing: Vec<&str> = [
            ("name", &name),
            ("race", &race),
            ("class", &class),
            ("background", &background),
            ("alignment", &alignment),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k)
        .collect();
        return Err(format!("missing required fields: {}", missing.join(", ")));
    };

    let mut character = Character::new(name, race, class, background, alignment);
    character.subclass = text(object, &["subclass", "subClass"]);

    if let Some(level) = number(object, &["level"]) {
        character.set_level(level.clamp(0, i64::from(u32::MAX)) as u32);
    }
    if let Some(xp) = number(object, &["experiencePoints", "experience", "xp"]) {
        character.experience_points = xp.clamp(0, i64::from(u32::MAX)) as u32;
    }

    let nested_scores = ["abilities", "abilityScores", "stats"]
        .iter()
        .find_map(|k| object.get(*k).and_then(Value::as_object));
    for ability in Ability::ALL {
        let keys = [
            ability.display_name().to_lowercase(),
            ability.abbreviation().to_string(),
        ];
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let score = number(object, &keys).or_else(|| nested_scores.and_then(|m| number(m, &keys)));
        if let Some(score) = score {
            character.set_ability_score(ability, clamp_i32(score));
        }
    }

    if let Some(max) = number(object, &["maxHitPoints", "maxHp", "max_hit_points"]) {
        character.set_max_hit_points(clamp_i32(max));
        character.set_hit_points(character.max_hit_points());
    }
    if let Some(current) = number(object, &["hitPoints", "hp", "currentHitPoints", "hit_points"]) {
        character.set_hit_points(clamp_i32(current));
    }
    if let Some(ac) = number(object, &["armorClass", "ac", "armor_class"]) {
        character.armor_class = clamp_i32(ac);
    }
    if let Some(speed) = number(object, &["speed"]) {
        character.speed = clamp_i32(speed);
    }
    if let Some(initiative) = number(object, &["initiative"]) {
        character.initiative = clamp_i32(initiative);
    }

    Ok(ParsedDocument::character_only(character))
}

fn text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number(object: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(number_from_value))
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AbilityScores, ClassEntry, NoteCategory};
    use crate::domain::value_objects::{Avatar, ProficiencyLevel, Skill};
    use crate::infrastructure::export::{export_basic, export_extended, export_external};

    fn paladin() -> Character {
        let mut character =
            Character::new("Aria", "Human", "Paladin", "Noble", "Lawful Good")
                .with_subclass("Devotion")
                .with_level(6)
                .with_abilities(AbilityScores::new(16, 10, 14, 8, 12, 16))
                .with_hit_points(40, 52);
        character.experience_points = 14_000;
        character.armor_class = 18;
        character.temporary_hit_points = 3;
        character.set_skill_proficiency(Skill::Persuasion, ProficiencyLevel::Expertise);
        character.set_saving_throw_proficiency(Ability::Wisdom, true);
        character.set_class_resource("Lay on Hands", 20, 30);
        character.add_class_entry(ClassEntry::new("Warlock", 1));
        character.ideals = "Protect the weak".to_string();
        character.equipment = vec!["Longsword".to_string(), "Shield".to_string()];
        character.currency.platinum = 3;
        character.avatar = Some(Avatar::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2]));
        character
    }

    fn same_except_identity(imported: &Character, original: &Character) -> Character {
        let mut aligned = imported.clone();
        aligned.id = original.id;
        aligned.created_at = original.created_at;
        aligned.updated_at = original.updated_at;
        aligned
    }

    #[test]
    fn test_basic_round_trip_preserves_every_field() {
        let original = paladin();
        let imported = import_any(&export_basic(&original).unwrap()).unwrap();

        assert_eq!(imported.format, ImportFormat::Basic);
        assert_ne!(imported.character.id, original.id);
        assert_eq!(same_except_identity(&imported.character, &original), original);
    }

    #[test]
    fn test_extended_round_trip_restamps_related_records() {
        let original = paladin();
        let relationships = vec![
            Relationship::new(original.id, "Lord Neverember").with_level(2),
            Relationship::new(original.id, "Sildar").with_description("Old friend"),
        ];
        let notes = vec![
            Note::new(original.id, "Cragmaw Hideout", NoteCategory::Location)
                .with_content("Goblin cave north of the road"),
        ];
        let json = export_extended(&original, &relationships, &notes, &[], &[]).unwrap();

        let imported = import_any(&json).unwrap();
        assert_eq!(imported.format, ImportFormat::Extended);
        assert_eq!(same_except_identity(&imported.character, &original), original);

        let new_id = imported.character.id;
        assert_eq!(imported.relationships.len(), 2);
        for (copy, source) in imported.relationships.iter().zip(&relationships) {
            assert_eq!(copy.character_id, new_id);
            assert_ne!(copy.id, source.id);
            assert_eq!(copy.name, source.name);
            assert_eq!(copy.description, source.description);
            assert_eq!(copy.level(), source.level());
        }
        assert_eq!(imported.notes.len(), 1);
        assert_eq!(imported.notes[0].character_id, new_id);
        assert_eq!(imported.notes[0].content, notes[0].content);
    }

    #[test]
    fn test_external_round_trip_recovers_core_fields() {
        let original = paladin();
        let imported = import_any(&export_external(&original).unwrap()).unwrap();
        let character = imported.character;

        assert_eq!(imported.format, ImportFormat::External);
        assert_eq!(character.race, original.race);
        assert_eq!(character.character_class, original.character_class);
        assert_eq!(character.background, original.background);
        assert_eq!(character.alignment, original.alignment);
        assert_eq!(character.level(), original.level());
        for ability in Ability::ALL {
            assert_eq!(character.ability_score(ability), original.ability_score(ability));
        }
        assert!(character.ideals.is_empty());
    }

    #[test]
    fn test_extended_wins_over_bare_character() {
        let outer = Character::new("Outer", "Elf", "Ranger", "Outlander", "Neutral");
        let inner = Character::new("Inner", "Orc", "Barbarian", "Outlander", "Chaotic Neutral");
        let mut document = serde_json::to_value(&outer).unwrap();
        document["character"] = serde_json::to_value(&inner).unwrap();

        let imported = import_any(&document.to_string()).unwrap();
        assert_eq!(imported.format, ImportFormat::Extended);
        assert_eq!(imported.character.name, "Inner");
    }

    #[test]
    fn test_manual_extraction_accepts_class_aliases() {
        let json = r#"{
            "name": "Kell",
            "race": "Tiefling",
            "class": "Warlock",
            "background": "Charlatan",
            "alignment": "Chaotic Good",
            "level": "5",
            "abilities": {"cha": 18, "dex": "14"},
            "hp": 33,
            "maxHp": 38
        }"#;
        let imported = import_any(json).unwrap();
        let character = imported.character;

        assert_eq!(imported.format, ImportFormat::Manual);
        assert_eq!(character.character_class, "Warlock");
        assert_eq!(character.level(), 5);
        assert_eq!(character.ability_score(Ability::Charisma), 18);
        assert_eq!(character.ability_score(Ability::Dexterity), 14);
        assert_eq!(character.max_hit_points(), 38);
        assert_eq!(character.hit_points(), 33);
    }

    #[test]
    fn test_import_clamps_out_of_range_values() {
        let mut document = serde_json::to_value(paladin()).unwrap();
        document["strength"] = 99.into();
        document["hitPoints"] = (-5).into();
        document["avatar"] = Value::Null;

        let imported = import_any(&document.to_string()).unwrap();
        assert_eq!(imported.character.ability_score(Ability::Strength), 30);
        assert_eq!(imported.character.hit_points(), 0);
    }

    #[test]
    fn test_import_takes_level_from_class_entries() {
        let mut document = serde_json::to_value(paladin()).unwrap();
        document["level"] = 3.into();
        document["classes"] = serde_json::json!([
            {"name": "Fighter", "level": 5},
            {"name": "Wizard", "level": 2}
        ]);

        let imported = import_any(&document.to_string()).unwrap();
        assert_eq!(imported.format, ImportFormat::Basic);
        assert_eq!(imported.character.level(), 7);
        assert_eq!(imported.character.total_class_level(), Some(7));
        assert_eq!(imported.character.character_class, "Fighter");
        assert_eq!(imported.character.subclass, None);
    }

    #[test]
    fn test_unrecognized_avatar_is_dropped_on_import() {
        let mut document = serde_json::to_value(Character::new("A", "B", "C", "D", "E")).unwrap();
        document["avatar"] = "AAECAw==".into();

        let imported = import_any(&document.to_string()).unwrap();
        assert!(imported.character.avatar.is_none());
    }

    #[test]
    fn test_unrecognized_document_reports_every_strategy() {
        let err = import_any(r#"{"name": "Nobody"}"#).unwrap_err();
        match &err {
            TransferError::Unrecognized(failures) => {
                let formats: Vec<ImportFormat> = failures.iter().map(|f| f.format).collect();
                assert_eq!(
                    formats,
                    vec![
                        ImportFormat::External,
                        ImportFormat::Extended,
                        ImportFormat::Basic,
                        ImportFormat::Manual
                    ]
                );
                assert!(failures[3].reason.contains("race"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("manual: missing required fields"));
        assert!(import_any("not json").is_err());
    }
}
