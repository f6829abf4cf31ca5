//! Domain entities - Core business objects with identity

mod character;
mod note;
mod reference;
mod relationship;

pub use character::{
    AbilityScores, Character, ClassEntry, ClassResource, Currency, MAX_LEVEL, MIN_LEVEL,
};
pub use note::{Note, NoteCategory};
pub use reference::{
    parse_challenge_rating, slugify, Background, Favorite, FavoriteKind, Feat, MagicItem, Monster,
    MonsterAction, ReferenceRecord, Spell,
};
pub use relationship::{
    Relationship, RelationshipStatus, DEFAULT_RELATIONSHIP_LEVEL, MAX_RELATIONSHIP_LEVEL,
};
