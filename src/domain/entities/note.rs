//! Note entity - Journal entries kept by a player character

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CharacterId, NoteId};

/// What a journal entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteCategory {
    #[default]
    General,
    Location,
    Item,
    Quest,
    Lore,
    Npc,
}

impl NoteCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" => Some(Self::General),
            "location" => Some(Self::Location),
            "item" => Some(Self::Item),
            "quest" => Some(Self::Quest),
            "lore" => Some(Self::Lore),
            "npc" => Some(Self::Npc),
            _ => None,
        }
    }
}

/// A free-form journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: NoteId,
    pub character_id: CharacterId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: NoteCategory,

    // Category-specific details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(character_id: CharacterId, title: impl Into<String>, category: NoteCategory) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            character_id,
            title: title.into(),
            content: String::new(),
            category,
            location: None,
            item: None,
            quest: None,
            lore: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_quest(mut self, quest: impl Into<String>) -> Self {
        self.quest = Some(quest.into());
        self
    }

    pub fn with_lore(mut self, lore: impl Into<String>) -> Self {
        self.lore = Some(lore.into());
        self
    }

    /// The detail field that belongs to this note's category, if any
    pub fn category_detail(&self) -> Option<&str> {
        match self.category {
            NoteCategory::Location => self.location.as_deref(),
            NoteCategory::Item => self.item.as_deref(),
            NoteCategory::Quest => self.quest.as_deref(),
            NoteCategory::Lore => self.lore.as_deref(),
            NoteCategory::General | NoteCategory::Npc => None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_detail() {
        let note = Note::new(CharacterId::new(), "The Yawning Portal", NoteCategory::Location)
            .with_location("Waterdeep")
            .with_item("Rope");
        assert_eq!(note.category_detail(), Some("Waterdeep"));

        let general = Note::new(CharacterId::new(), "Session 1", NoteCategory::General);
        assert_eq!(general.category_detail(), None);
    }

    #[test]
    fn test_optional_fields_are_omitted_from_json() {
        let note = Note::new(CharacterId::new(), "Find the sword", NoteCategory::Quest)
            .with_quest("Retrieve Dawnbringer");
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"quest\":\"Retrieve Dawnbringer\""));
        assert!(!json.contains("\"lore\""));
        assert!(json.contains("\"category\":\"quest\""));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(NoteCategory::parse("Lore"), Some(NoteCategory::Lore));
        assert_eq!(NoteCategory::parse("recipe"), None);
    }
}
