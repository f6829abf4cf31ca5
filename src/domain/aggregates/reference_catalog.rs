//! Reference Catalog - Every read-only rules record loaded at startup
//!
//! The catalog is built once and never mutated afterwards, so it is
//! shared freely between services behind an `Arc`.

use crate::domain::entities::{
    Background, FavoriteKind, Feat, MagicItem, Monster, ReferenceRecord, Spell,
};

/// The loaded rules content
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    spells: Vec<Spell>,
    feats: Vec<Feat>,
    backgrounds: Vec<Background>,
    monsters: Vec<Monster>,
    magic_items: Vec<MagicItem>,
}

impl ReferenceCatalog {
    /// Build a catalog, assigning slug ids where missing and sorting by name
    pub fn new(
        spells: Vec<Spell>,
        feats: Vec<Feat>,
        backgrounds: Vec<Background>,
        monsters: Vec<Monster>,
        magic_items: Vec<MagicItem>,
    ) -> Self {
        Self {
            spells: prepare(spells),
            feats: prepare(feats),
            backgrounds: prepare(backgrounds),
            monsters: prepare(monsters),
            magic_items: prepare(magic_items),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn feats(&self) -> &[Feat] {
        &self.feats
    }

    pub fn backgrounds(&self) -> &[Background] {
        &self.backgrounds
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn magic_items(&self) -> &[MagicItem] {
        &self.magic_items
    }

    pub fn spell(&self, id: &str) -> Option<&Spell> {
        find(&self.spells, id)
    }

    pub fn monster(&self, id: &str) -> Option<&Monster> {
        find(&self.monsters, id)
    }

    /// Whether a record of this kind exists
    pub fn contains(&self, kind: FavoriteKind, id: &str) -> bool {
        match kind {
            FavoriteKind::Spell => find(&self.spells, id).is_some(),
            FavoriteKind::Monster => find(&self.monsters, id).is_some(),
            FavoriteKind::Feat => find(&self.feats, id).is_some(),
            FavoriteKind::Background => find(&self.backgrounds, id).is_some(),
            FavoriteKind::MagicItem => find(&self.magic_items, id).is_some(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Spells matching an optional name fragment, level and class
    pub fn search_spells(
        &self,
        name: Option<&str>,
        level: Option<u8>,
        class_name: Option<&str>,
    ) -> Vec<&Spell> {
        self.spells
            .iter()
            .filter(|s| name_matches(s.name(), name))
            .filter(|s| level.map_or(true, |l| s.level == l))
            .filter(|s| class_name.map_or(true, |c| s.available_to(c)))
            .collect()
    }

    /// Monsters matching an optional name fragment and challenge rating range
    pub fn search_monsters(
        &self,
        name: Option<&str>,
        min_cr: Option<f32>,
        max_cr: Option<f32>,
    ) -> Vec<&Monster> {
        self.monsters
            .iter()
            .filter(|m| name_matches(m.name(), name))
            .filter(|m| match (m.challenge_value(), min_cr, max_cr) {
                (_, None, None) => true,
                (None, _, _) => false,
                (Some(cr), min, max) => {
                    min.map_or(true, |min| cr >= min) && max.map_or(true, |max| cr <= max)
                }
            })
            .collect()
    }

    pub fn search_feats(&self, name: Option<&str>) -> Vec<&Feat> {
        self.feats
            .iter()
            .filter(|f| name_matches(f.name(), name))
            .collect()
    }

    pub fn search_backgrounds(&self, name: Option<&str>) -> Vec<&Background> {
        self.backgrounds
            .iter()
            .filter(|b| name_matches(b.name(), name))
            .collect()
    }

    pub fn search_magic_items(&self, name: Option<&str>, rarity: Option<&str>) -> Vec<&MagicItem> {
        self.magic_items
            .iter()
            .filter(|i| name_matches(i.name(), name))
            .filter(|i| rarity.map_or(true, |r| i.rarity.eq_ignore_ascii_case(r)))
            .collect()
    }
}

fn prepare<T: ReferenceRecord>(mut records: Vec<T>) -> Vec<T> {
    for record in records.iter_mut() {
        record.ensure_id();
    }
    records.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
    records
}

fn find<'a, T: ReferenceRecord>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.id() == id)
}

fn name_matches(name: &str, fragment: Option<&str>) -> bool {
    match fragment.map(str::trim) {
        None | Some("") => true,
        Some(fragment) => name.to_lowercase().contains(&fragment.to_lowercase()),
    }
}
