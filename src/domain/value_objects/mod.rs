//! Value objects - Immutable objects defined by their attributes

mod ability;
mod avatar;
mod ids;

pub use ability::{
    ability_modifier, proficiency_bonus_for_level, Ability, ProficiencyLevel, Skill,
    MAX_ABILITY_SCORE, MIN_ABILITY_SCORE,
};
pub use avatar::{Avatar, ImageFormat};
pub use ids::*;
