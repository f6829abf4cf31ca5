//! Reference data and favorites API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::character_routes::parse_character_id;
use super::error_response;
use crate::application::dto::{
    FavoriteToggleResponseDto, MagicItemQueryDto, MonsterQueryDto, NameQueryDto, SpellQueryDto,
};
use crate::application::services::{CharacterFavorites, ReferenceService};
use crate::domain::entities::{
    parse_challenge_rating, Background, FavoriteKind, Feat, MagicItem, Monster, Spell,
};
use crate::infrastructure::state::AppState;

fn parse_rating(raw: Option<&str>) -> Result<Option<f32>, (StatusCode, String)> {
    raw.map(|value| {
        parse_challenge_rating(value).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid challenge rating: {}", value),
            )
        })
    })
    .transpose()
}

pub async fn list_spells(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpellQueryDto>,
) -> Json<Vec<Spell>> {
    Json(state.reference_service.search_spells(
        query.name.as_deref(),
        query.level,
        query.class.as_deref(),
    ))
}

/// Monsters filtered by name and a challenge rating range
pub async fn list_monsters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonsterQueryDto>,
) -> Result<Json<Vec<Monster>>, (StatusCode, String)> {
    let min_cr = parse_rating(query.min_cr.as_deref())?;
    let max_cr = parse_rating(query.max_cr.as_deref())?;
    Ok(Json(state.reference_service.search_monsters(
        query.name.as_deref(),
        min_cr,
        max_cr,
    )))
}

pub async fn list_feats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQueryDto>,
) -> Json<Vec<Feat>> {
    Json(state.reference_service.search_feats(query.name.as_deref()))
}

pub async fn list_backgrounds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQueryDto>,
) -> Json<Vec<Background>> {
    Json(state.reference_service.search_backgrounds(query.name.as_deref()))
}

pub async fn list_magic_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MagicItemQueryDto>,
) -> Json<Vec<MagicItem>> {
    Json(
        state
            .reference_service
            .search_magic_items(query.name.as_deref(), query.rarity.as_deref()),
    )
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
) -> Result<Json<CharacterFavorites>, (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let favorites = state
        .reference_service
        .list_favorites(character_id)
        .await
        .map_err(error_response)?;

    Ok(Json(favorites))
}

/// Flip the favorite flag of one reference record
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path((character_id, kind, item_id)): Path<(String, String, String)>,
) -> Result<Json<FavoriteToggleResponseDto>, (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let kind = FavoriteKind::parse(&kind).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown favorite kind: {}", kind),
        )
    })?;

    let favorite = state
        .reference_service
        .toggle_favorite(character_id, kind, &item_id)
        .await
        .map_err(error_response)?;

    Ok(Json(FavoriteToggleResponseDto {
        kind,
        item_id,
        favorite,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::TestApp;

    #[tokio::test]
    async fn test_search_endpoints() {
        let app = TestApp::new().await;

        let (status, spells) = app
            .send("GET", "/api/reference/spells?class=paladin", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(spells[0]["name"], "Bless");

        let (_, spells) = app.send("GET", "/api/reference/spells?level=3", None).await;
        assert_eq!(spells.as_array().unwrap().len(), 1);

        let (_, monsters) = app
            .send("GET", "/api/reference/monsters?maxCr=1/2", None)
            .await;
        assert_eq!(monsters.as_array().unwrap().len(), 1);
        assert_eq!(monsters[0]["name"], "Goblin");

        let (status, _) = app
            .send("GET", "/api/reference/monsters?minCr=lots", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, feats) = app.send("GET", "/api/reference/feats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(feats.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_and_list_favorites() {
        let app = TestApp::new().await;
        let id = app.create_character("Caleb").await;

        let (status, body) = app
            .send(
                "POST",
                &format!("/api/characters/{}/favorites/spell/fireball", id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"], true);
        assert_eq!(body["itemId"], "fireball");

        let (_, favorites) = app
            .send("GET", &format!("/api/characters/{}/favorites", id), None)
            .await;
        assert_eq!(favorites["spells"][0]["name"], "Fireball");

        let (status, _) = app
            .send(
                "POST",
                &format!("/api/characters/{}/favorites/spell/wish", id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send(
                "POST",
                &format!("/api/characters/{}/favorites/deity/pelor", id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
