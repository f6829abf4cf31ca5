//! Relationship entity - An NPC known to a player character

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CharacterId, RelationshipId};

pub const MAX_RELATIONSHIP_LEVEL: u8 = 10;
pub const DEFAULT_RELATIONSHIP_LEVEL: u8 = 5;

/// An NPC the character has met, with a 0-10 attitude scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub id: RelationshipId,
    pub character_id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_level")]
    relationship_level: u8,
    #[serde(default = "default_alive")]
    pub is_alive: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_level() -> u8 {
    DEFAULT_RELATIONSHIP_LEVEL
}

fn default_alive() -> bool {
    true
}

impl Relationship {
    pub fn new(character_id: CharacterId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RelationshipId::new(),
            character_id,
            name: name.into(),
            description: String::new(),
            relationship_level: DEFAULT_RELATIONSHIP_LEVEL,
            is_alive: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.set_level(level);
        self
    }

    pub fn level(&self) -> u8 {
        self.relationship_level
    }

    pub fn set_level(&mut self, level: u8) {
        self.relationship_level = level.min(MAX_RELATIONSHIP_LEVEL);
    }

    /// Shift the level by `delta`, saturating at both ends
    pub fn adjust_level(&mut self, delta: i32) {
        let level = (i32::from(self.relationship_level) + delta)
            .clamp(0, i32::from(MAX_RELATIONSHIP_LEVEL));
        self.relationship_level = level as u8;
    }

    pub fn status(&self) -> RelationshipStatus {
        RelationshipStatus::from_level(self.relationship_level)
    }

    pub fn normalize(&mut self) {
        self.set_level(self.relationship_level);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Coarse attitude derived from the relationship level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Enemy,
    Neutral,
    Friend,
}

impl RelationshipStatus {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=3 => Self::Enemy,
            4..=6 => Self::Neutral,
            _ => Self::Friend,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Enemy => "Enemy",
            Self::Neutral => "Neutral",
            Self::Friend => "Friend",
        }
    }
}
