//! Abilities, skills and the rules that derive modifiers from them

use serde::{Deserialize, Serialize};

/// Lowest and highest legal ability score
pub const MIN_ABILITY_SCORE: i32 = 1;
pub const MAX_ABILITY_SCORE: i32 = 30;

/// One of the six base attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// Three-letter abbreviation (`str`, `dex`, ...)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Strength => "str",
            Self::Dexterity => "dex",
            Self::Constitution => "con",
            Self::Intelligence => "int",
            Self::Wisdom => "wis",
            Self::Charisma => "cha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Dexterity => "Dexterity",
            Self::Constitution => "Constitution",
            Self::Intelligence => "Intelligence",
            Self::Wisdom => "Wisdom",
            Self::Charisma => "Charisma",
        }
    }

    /// Parse from a full name or abbreviation, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.abbreviation() == s || a.display_name().to_lowercase() == s)
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The eighteen skills, each governed by one ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Self::Acrobatics,
        Self::AnimalHandling,
        Self::Arcana,
        Self::Athletics,
        Self::Deception,
        Self::History,
        Self::Insight,
        Self::Intimidation,
        Self::Investigation,
        Self::Medicine,
        Self::Nature,
        Self::Perception,
        Self::Performance,
        Self::Persuasion,
        Self::Religion,
        Self::SleightOfHand,
        Self::Stealth,
        Self::Survival,
    ];

    pub fn ability(&self) -> Ability {
        match self {
            Self::Athletics => Ability::Strength,
            Self::Acrobatics | Self::SleightOfHand | Self::Stealth => Ability::Dexterity,
            Self::Arcana
            | Self::History
            | Self::Investigation
            | Self::Nature
            | Self::Religion => Ability::Intelligence,
            Self::AnimalHandling
            | Self::Insight
            | Self::Medicine
            | Self::Perception
            | Self::Survival => Ability::Wisdom,
            Self::Deception | Self::Intimidation | Self::Performance | Self::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Acrobatics => "Acrobatics",
            Self::AnimalHandling => "Animal Handling",
            Self::Arcana => "Arcana",
            Self::Athletics => "Athletics",
            Self::Deception => "Deception",
            Self::History => "History",
            Self::Insight => "Insight",
            Self::Intimidation => "Intimidation",
            Self::Investigation => "Investigation",
            Self::Medicine => "Medicine",
            Self::Nature => "Nature",
            Self::Perception => "Perception",
            Self::Performance => "Performance",
            Self::Persuasion => "Persuasion",
            Self::Religion => "Religion",
            Self::SleightOfHand => "Sleight of Hand",
            Self::Stealth => "Stealth",
            Self::Survival => "Survival",
        }
    }

    /// Parse from a display name, camelCase or kebab-case key
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL.into_iter().find(|skill| {
            skill
                .display_name()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
                == normalized
        })
    }
}

/// How well a character is trained in a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProficiencyLevel {
    #[default]
    None,
    Proficient,
    Expertise,
}

impl ProficiencyLevel {
    /// How many times the proficiency bonus applies
    pub fn multiplier(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Proficient => 1,
            Self::Expertise => 2,
        }
    }
}

/// Modifier for an ability score, rounded toward negative infinity
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus for a total character level
pub fn proficiency_bonus_for_level(level: u32) -> i32 {
    let level = level.clamp(1, 20) as i32;
    2 + (level - 1) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier_rounds_down() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn test_proficiency_bonus_progression() {
        assert_eq!(proficiency_bonus_for_level(1), 2);
        assert_eq!(proficiency_bonus_for_level(4), 2);
        assert_eq!(proficiency_bonus_for_level(5), 3);
        assert_eq!(proficiency_bonus_for_level(9), 4);
        assert_eq!(proficiency_bonus_for_level(17), 6);
        assert_eq!(proficiency_bonus_for_level(20), 6);
    }

    #[test]
    fn test_skill_parsing() {
        assert_eq!(Skill::parse("sleight of hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::parse("animal-handling"), Some(Skill::AnimalHandling));
        assert_eq!(Skill::parse("Perception"), Some(Skill::Perception));
        assert_eq!(Skill::parse("cooking"), None);
    }

    #[test]
    fn test_ability_parsing() {
        assert_eq!(Ability::parse("DEX"), Some(Ability::Dexterity));
        assert_eq!(Ability::parse("wisdom"), Some(Ability::Wisdom));
        assert_eq!(Ability::parse("luck"), None);
    }

    #[test]
    fn test_every_skill_has_a_governing_ability() {
        let strength_skills: Vec<_> = Skill::ALL
            .iter()
            .filter(|s| s.ability() == Ability::Strength)
            .collect();
        assert_eq!(strength_skills, vec![&Skill::Athletics]);
        assert_eq!(Skill::Stealth.ability(), Ability::Dexterity);
    }

    #[test]
    fn test_skill_map_keys_serialize_as_strings() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Skill::SleightOfHand, ProficiencyLevel::Expertise);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"sleightOfHand":"expertise"}"#);
    }
}
