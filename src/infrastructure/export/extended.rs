//! Extended export - one character with everything attached to it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Character, Monster, Note, Relationship, Spell};

use super::{encode_without_avatar_on_failure, TransferError};

pub const EXTENDED_EXPORT_VERSION: &str = "1.0";

fn default_version() -> String {
    EXTENDED_EXPORT_VERSION.to_string()
}

/// A character bundled with its relationships, notes and favorites
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedCharacterExport {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
    pub character: Character,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub favorite_spells: Vec<Spell>,
    #[serde(default)]
    pub favorite_monsters: Vec<Monster>,
}

/// Serialize a character bundle as pretty JSON, dropping an avatar that
/// cannot be encoded.
pub fn export_extended(
    character: &Character,
    relationships: &[Relationship],
    notes: &[Note],
    favorite_spells: &[Spell],
    favorite_monsters: &[Monster],
) -> Result<String, TransferError> {
    let bundle = ExtendedCharacterExport {
        version: default_version(),
        export_date: Utc::now(),
        character: character.clone(),
        relationships: relationships.to_vec(),
        notes: notes.to_vec(),
        favorite_spells: favorite_spells.to_vec(),
        favorite_monsters: favorite_monsters.to_vec(),
    };
    encode_without_avatar_on_failure(bundle, |b| &mut b.character.avatar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NoteCategory;
    use crate::domain::value_objects::Avatar;

    #[test]
    fn test_export_extended_bundles_related_records() {
        let character = Character::new("Brom", "Dwarf", "Cleric", "Acolyte", "Lawful Good");
        let relationships = vec![Relationship::new(character.id, "Sister Garaele").with_level(8)];
        let notes = vec![Note::new(character.id, "Phandalin", NoteCategory::Location)];

        let json = export_extended(&character, &relationships, &notes, &[], &[]).unwrap();
        let bundle: ExtendedCharacterExport = serde_json::from_str(&json).unwrap();

        assert_eq!(bundle.version, EXTENDED_EXPORT_VERSION);
        assert_eq!(bundle.character.name, "Brom");
        assert_eq!(bundle.relationships.len(), 1);
        assert_eq!(bundle.relationships[0].level(), 8);
        assert_eq!(bundle.notes[0].category, NoteCategory::Location);
    }

    #[test]
    fn test_export_extended_drops_unencodable_avatar() {
        let mut character = Character::new("Brom", "Dwarf", "Cleric", "Acolyte", "Lawful Good");
        character.avatar = Some(Avatar::new(vec![0u8; 16]));

        let json = export_extended(&character, &[], &[], &[], &[]).unwrap();
        let bundle: ExtendedCharacterExport = serde_json::from_str(&json).unwrap();
        assert!(bundle.character.avatar.is_none());
    }
}
