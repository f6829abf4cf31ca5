//! Character entity - A player character sheet
//!
//! # Architectural Note (Character Serialization)
//!
//! Character carries serde derives because its JSON shape is the persisted
//! record and the "basic" export format at the same time. Field names are
//! camelCase so documents written by older mobile builds decode unchanged.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    ability_modifier, proficiency_bonus_for_level, Ability, Avatar, CharacterId,
    ProficiencyLevel, Skill, MAX_ABILITY_SCORE, MIN_ABILITY_SCORE,
};

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 20;

/// A player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default)]
    pub id: CharacterId,
    pub name: String,
    pub race: String,
    pub character_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
    pub background: String,
    pub alignment: String,
    #[serde(default = "default_level")]
    level: u32,
    #[serde(default)]
    pub experience_points: u32,

    #[serde(flatten)]
    abilities: AbilityScores,

    // Combat
    #[serde(default = "default_armor_class")]
    pub armor_class: i32,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default = "default_speed")]
    pub speed: i32,
    #[serde(default)]
    hit_points: i32,
    #[serde(default)]
    max_hit_points: i32,
    #[serde(default)]
    pub temporary_hit_points: i32,
    #[serde(default = "default_proficiency_bonus")]
    pub proficiency_bonus: i32,

    // Proficiencies
    #[serde(default)]
    pub skill_proficiencies: BTreeMap<Skill, ProficiencyLevel>,
    #[serde(default)]
    pub saving_throw_proficiencies: BTreeSet<Ability>,

    // Narrative
    #[serde(default)]
    pub personality_traits: String,
    #[serde(default)]
    pub ideals: String,
    #[serde(default)]
    pub bonds: String,
    #[serde(default)]
    pub flaws: String,
    #[serde(default)]
    pub features_and_traits: String,
    #[serde(default)]
    pub proficiencies_and_languages: String,

    // Inventory
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub treasure: Vec<String>,
    #[serde(default)]
    pub currency: Currency,

    /// Named class-specific counters ("Rage", "Ki Points", ...)
    #[serde(default)]
    pub class_resources: BTreeMap<String, ClassResource>,
    /// Per-class levels once the character has been migrated to multiclass tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<ClassEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_level() -> u32 {
    MIN_LEVEL
}

fn default_armor_class() -> i32 {
    10
}

fn default_speed() -> i32 {
    30
}

fn default_proficiency_bonus() -> i32 {
    proficiency_bonus_for_level(MIN_LEVEL)
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        character_class: impl Into<String>,
        background: impl Into<String>,
        alignment: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CharacterId::new(),
            name: name.into(),
            race: race.into(),
            character_class: character_class.into(),
            subclass: None,
            background: background.into(),
            alignment: alignment.into(),
            level: MIN_LEVEL,
            experience_points: 0,
            abilities: AbilityScores::default(),
            armor_class: default_armor_class(),
            initiative: 0,
            speed: default_speed(),
            hit_points: 10,
            max_hit_points: 10,
            temporary_hit_points: 0,
            proficiency_bonus: default_proficiency_bonus(),
            skill_proficiencies: BTreeMap::new(),
            saving_throw_proficiencies: BTreeSet::new(),
            personality_traits: String::new(),
            ideals: String::new(),
            bonds: String::new(),
            flaws: String::new(),
            features_and_traits: String::new(),
            proficiencies_and_languages: String::new(),
            equipment: Vec::new(),
            treasure: Vec::new(),
            currency: Currency::default(),
            class_resources: BTreeMap::new(),
            classes: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_subclass(mut self, subclass: impl Into<String>) -> Self {
        self.subclass = Some(subclass.into());
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.set_level(level);
        self
    }

    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn with_hit_points(mut self, current: i32, max: i32) -> Self {
        self.set_max_hit_points(max);
        self.set_hit_points(current);
        self
    }

    // -- Level --------------------------------------------------------------

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Set the total level and recompute the proficiency bonus
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        self.proficiency_bonus = proficiency_bonus_for_level(self.level);
    }

    // -- Hit points ---------------------------------------------------------

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> i32 {
        self.max_hit_points
    }

    /// Current HP, clamped to `[0, max_hit_points]`
    pub fn set_hit_points(&mut self, value: i32) {
        self.hit_points = value.clamp(0, self.max_hit_points);
    }

    pub fn set_max_hit_points(&mut self, value: i32) {
        self.max_hit_points = value.max(0);
        self.hit_points = self.hit_points.clamp(0, self.max_hit_points);
    }

    /// Apply damage, draining temporary hit points first.
    /// Returns the damage that reached current hit points.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let absorbed = amount.min(self.temporary_hit_points.max(0));
        self.temporary_hit_points -= absorbed;
        let remaining = amount - absorbed;
        let before = self.hit_points;
        self.set_hit_points(self.hit_points.saturating_sub(remaining));
        before - self.hit_points
    }

    /// Heal up to max. Returns hit points actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hit_points;
        self.set_hit_points(self.hit_points.saturating_add(amount.max(0)));
        self.hit_points - before
    }

    pub fn is_unconscious(&self) -> bool {
        self.hit_points == 0
    }

    /// Restore hit points and every class resource
    pub fn long_rest(&mut self) {
        self.hit_points = self.max_hit_points;
        self.temporary_hit_points = 0;
        for resource in self.class_resources.values_mut() {
            resource.restore();
        }
    }

    // -- Abilities ----------------------------------------------------------

    pub fn abilities(&self) -> &AbilityScores {
        &self.abilities
    }

    pub fn ability_score(&self, ability: Ability) -> i32 {
        self.abilities.get(ability)
    }

    /// Set an ability score, clamped to `[1, 30]`
    pub fn set_ability_score(&mut self, ability: Ability, score: i32) {
        self.abilities.set(ability, score);
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.ability_score(ability))
    }

    // -- Proficiencies ------------------------------------------------------

    pub fn skill_proficiency(&self, skill: Skill) -> ProficiencyLevel {
        self.skill_proficiencies
            .get(&skill)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_skill_proficiency(&mut self, skill: Skill, level: ProficiencyLevel) {
        if level == ProficiencyLevel::None {
            self.skill_proficiencies.remove(&skill);
        } else {
            self.skill_proficiencies.insert(skill, level);
        }
    }

    pub fn skill_modifier(&self, skill: Skill) -> i32 {
        self.ability_modifier(skill.ability())
            + self.proficiency_bonus * self.skill_proficiency(skill).multiplier()
    }

    pub fn has_saving_throw_proficiency(&self, ability: Ability) -> bool {
        self.saving_throw_proficiencies.contains(&ability)
    }

    pub fn set_saving_throw_proficiency(&mut self, ability: Ability, proficient: bool) {
        if proficient {
            self.saving_throw_proficiencies.insert(ability);
        } else {
            self.saving_throw_proficiencies.remove(&ability);
        }
    }

    pub fn saving_throw_modifier(&self, ability: Ability) -> i32 {
        let bonus = if self.has_saving_throw_proficiency(ability) {
            self.proficiency_bonus
        } else {
            0
        };
        self.ability_modifier(ability) + bonus
    }

    pub fn passive_perception(&self) -> i32 {
        10 + self.skill_modifier(Skill::Perception)
    }

    // -- Class resources ----------------------------------------------------

    pub fn set_class_resource(&mut self, name: impl Into<String>, current: i32, max: i32) {
        self.class_resources
            .insert(name.into(), ClassResource::with_current(current, max));
    }

    /// Spend `amount` uses of a resource. Fails if the resource is unknown
    /// or does not have enough uses left.
    pub fn use_class_resource(&mut self, name: &str, amount: i32) -> bool {
        match self.class_resources.get_mut(name) {
            Some(resource) => resource.spend(amount),
            None => false,
        }
    }

    pub fn remove_class_resource(&mut self, name: &str) -> bool {
        self.class_resources.remove(name).is_some()
    }

    // -- Multiclass ---------------------------------------------------------

    /// Copy the single class/level pair into `classes` if no class list exists yet.
    /// Returns true when a migration happened.
    pub fn migrate_classes(&mut self) -> bool {
        if self.classes.is_some() {
            return false;
        }
        self.classes = Some(vec![ClassEntry {
            name: self.character_class.clone(),
            level: self.level,
            subclass: self.subclass.clone(),
        }]);
        true
    }

    /// Add a class entry (or raise an existing one) and resync level and primary class
    pub fn add_class_entry(&mut self, entry: ClassEntry) {
        self.migrate_classes();
        let classes = self.classes.get_or_insert_with(Vec::new);
        match classes
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(&entry.name))
        {
            Some(existing) => {
                existing.level = entry.level.clamp(MIN_LEVEL, MAX_LEVEL);
                if entry.subclass.is_some() {
                    existing.subclass = entry.subclass;
                }
            }
            None => classes.push(ClassEntry {
                level: entry.level.clamp(MIN_LEVEL, MAX_LEVEL),
                ..entry
            }),
        }
        self.sync_from_classes();
    }

    pub fn total_class_level(&self) -> Option<u32> {
        self.classes
            .as_ref()
            .map(|classes| sum_levels(classes))
    }

    fn sync_from_classes(&mut self) {
        let Some(classes) = &self.classes else {
            return;
        };
        if let Some(primary) = classes.first() {
            self.character_class = primary.name.clone();
            self.subclass = primary.subclass.clone();
        }
        let total = sum_levels(classes);
        self.set_level(total);
    }

    // -- Housekeeping -------------------------------------------------------

    /// Re-establish every clamped invariant after decoding untrusted JSON
    pub fn normalize(&mut self) {
        self.level = self.level.clamp(MIN_LEVEL, MAX_LEVEL);
        self.abilities.normalize();
        self.max_hit_points = self.max_hit_points.max(0);
        self.hit_points = self.hit_points.clamp(0, self.max_hit_points);
        self.temporary_hit_points = self.temporary_hit_points.max(0);
        for resource in self.class_resources.values_mut() {
            resource.normalize();
        }
        if self.classes.as_ref().is_some_and(|classes| classes.is_empty()) {
            self.classes = None;
        }
        if let Some(classes) = &mut self.classes {
            for class in classes.iter_mut() {
                class.level = class.level.clamp(MIN_LEVEL, MAX_LEVEL);
            }
        }
        // Class entries win over a stale top-level level
        self.sync_from_classes();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The six ability scores, each clamped to `[1, 30]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbilityScores {
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        let mut scores = Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        };
        scores.normalize();
        scores
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        let score = score.clamp(MIN_ABILITY_SCORE, MAX_ABILITY_SCORE);
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
    }

    fn normalize(&mut self) {
        for ability in Ability::ALL {
            self.set(ability, self.get(ability));
        }
    }
}

/// Coins in the five standard denominations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Currency {
    pub copper: u32,
    pub silver: u32,
    pub electrum: u32,
    pub gold: u32,
    pub platinum: u32,
}

impl Currency {
    pub fn total_in_copper(&self) -> u64 {
        u64::from(self.copper)
            + u64::from(self.silver) * 10
            + u64::from(self.electrum) * 50
            + u64::from(self.gold) * 100
            + u64::from(self.platinum) * 1000
    }
}

/// A limited-use class feature counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassResource {
    pub current: i32,
    pub max: i32,
}

impl ClassResource {
    pub fn new(max: i32) -> Self {
        Self::with_current(max, max)
    }

    pub fn with_current(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    pub fn spend(&mut self, amount: i32) -> bool {
        let amount = amount.max(0);
        if amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    fn normalize(&mut self) {
        *self = Self::with_current(self.current, self.max);
    }
}

fn sum_levels(classes: &[ClassEntry]) -> u32 {
    classes
        .iter()
        .fold(0u32, |total, class| total.saturating_add(class.level))
}

/// One class in a multiclass build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
            subclass: None,
        }
    }
}
