//! Reference data - Read-only rules content loaded from bundled assets
//!
//! Records are never edited. The only per-character state attached to them
//! is the favorite flag, which lives in the favorites repository keyed by
//! `(kind, item id, character id)`.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CharacterId;

/// Common behaviour of every reference record
pub trait ReferenceRecord {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Fill in a slug id from the name when the asset did not provide one
    fn ensure_id(&mut self);
}

macro_rules! impl_reference_record {
    ($name:ident) => {
        impl ReferenceRecord for $name {
            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn ensure_id(&mut self) {
                if self.id.trim().is_empty() {
                    self.id = slugify(&self.name);
                }
            }
        }
    };
}

/// Lowercase, dash-separated identifier derived from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Kinds of reference record that can be favorited
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteKind {
    Spell,
    Monster,
    Feat,
    Background,
    MagicItem,
}

impl FavoriteKind {
    /// Accepts singular or plural, with dashes or underscores
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "spell" | "spells" => Some(Self::Spell),
            "monster" | "monsters" => Some(Self::Monster),
            "feat" | "feats" => Some(Self::Feat),
            "background" | "backgrounds" => Some(Self::Background),
            "magic_item" | "magic_items" => Some(Self::MagicItem),
            _ => None,
        }
    }
}

/// A favorited reference record, owned by one character
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub kind: FavoriteKind,
    pub item_id: String,
    pub character_id: CharacterId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub casting_time: String,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub components: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub higher_levels: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub ritual: bool,
    #[serde(default)]
    pub concentration: bool,
}

impl Spell {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn available_to(&self, class_name: &str) -> bool {
        self.classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class_name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feat {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub prerequisite: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skill_proficiencies: Vec<String>,
    #[serde(default)]
    pub tool_proficiencies: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub feature_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAction {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, rename = "type")]
    pub monster_type: String,
    #[serde(default)]
    pub alignment: String,
    #[serde(default)]
    pub armor_class: i32,
    #[serde(default)]
    pub hit_points: i32,
    #[serde(default)]
    pub hit_dice: String,
    #[serde(default)]
    pub speed: String,
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub dexterity: i32,
    #[serde(default)]
    pub constitution: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub wisdom: i32,
    #[serde(default)]
    pub charisma: i32,
    /// "0", "1/8", "1/4", "1/2", "1" ... "30"
    #[serde(default)]
    pub challenge_rating: String,
    #[serde(default)]
    pub traits: Vec<MonsterAction>,
    #[serde(default)]
    pub actions: Vec<MonsterAction>,
}

impl Monster {
    /// Numeric challenge rating, if the rating parses
    pub fn challenge_value(&self) -> Option<f32> {
        parse_challenge_rating(&self.challenge_rating)
    }
}

/// Parse a challenge rating written as a fraction (`1/4`) or a number
pub fn parse_challenge_rating(value: &str) -> Option<f32> {
    let value = value.trim();
    match value.split_once('/') {
        Some((num, den)) => {
            let num: f32 = num.trim().parse().ok()?;
            let den: f32 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => value.parse().ok(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub requires_attunement: bool,
    #[serde(default)]
    pub description: String,
}

impl_reference_record!(Spell);
impl_reference_record!(Feat);
impl_reference_record!(Background);
impl_reference_record!(Monster);
impl_reference_record!(MagicItem);
