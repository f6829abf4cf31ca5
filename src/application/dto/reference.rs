use serde::{Deserialize, Serialize};

use crate::domain::entities::FavoriteKind;

#[derive(Debug, Default, Deserialize)]
pub struct SpellQueryDto {
    pub name: Option<String>,
    pub level: Option<u8>,
    pub class: Option<String>,
}

/// Challenge ratings may be written as fractions (`1/4`) or decimals
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterQueryDto {
    pub name: Option<String>,
    pub min_cr: Option<String>,
    pub max_cr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQueryDto {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MagicItemQueryDto {
    pub name: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleResponseDto {
    pub kind: FavoriteKind,
    pub item_id: String,
    pub favorite: bool,
}
