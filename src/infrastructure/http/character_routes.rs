//! Character API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{error_response, parse_uuid};
use crate::application::dto::{
    AbilityScoreRequestDto, AmountRequestDto, CharacterResponseDto, ClassResourceRequestDto,
    CreateCharacterRequestDto, HitPointsRequestDto, SavingThrowRequestDto,
    SkillProficiencyRequestDto, UpdateCharacterRequestDto, UseResourceRequestDto,
};
use crate::application::services::CharacterService;
use crate::domain::entities::{Character, ClassEntry, Currency};
use crate::domain::value_objects::{Ability, CharacterId, Skill};
use crate::infrastructure::state::AppState;

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub(super) fn parse_character_id(id: &str) -> ApiResult<CharacterId> {
    parse_uuid(id, "character").map(CharacterId::from_uuid)
}

fn parse_ability(ability: &str) -> ApiResult<Ability> {
    Ability::parse(ability)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Unknown ability: {}", ability)))
}

fn respond(result: anyhow::Result<Character>) -> ApiResult<Json<CharacterResponseDto>> {
    result
        .map(|character| Json(CharacterResponseDto::from(character)))
        .map_err(error_response)
}

/// List all characters
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CharacterResponseDto>>> {
    let characters = state
        .character_service
        .list_characters()
        .await
        .map_err(error_response)?;

    Ok(Json(characters.into_iter().map(CharacterResponseDto::from).collect()))
}

/// Create a character
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCharacterRequestDto>,
) -> ApiResult<(StatusCode, Json<CharacterResponseDto>)> {
    let character = state
        .character_service
        .create_character(req.into())
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(character))))
}

/// Get a character by ID
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let character = state
        .character_service
        .get_character(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Character not found".to_string()))?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Update a character
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCharacterRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.update_character(id, req.into()).await)
}

/// Delete a character and everything attached to it
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_character_id(&id)?;
    state
        .character_service
        .delete_character(id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_hit_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<HitPointsRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(
        state
            .character_service
            .set_hit_points(id, req.current, req.max)
            .await,
    )
}

pub async fn apply_damage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.apply_damage(id, req.amount).await)
}

pub async fn heal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.heal(id, req.amount).await)
}

pub async fn long_rest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.long_rest(id).await)
}

pub async fn set_ability_score(
    State(state): State<Arc<AppState>>,
    Path((id, ability)): Path<(String, String)>,
    Json(req): Json<AbilityScoreRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let ability = parse_ability(&ability)?;
    respond(
        state
            .character_service
            .set_ability_score(id, ability, req.score)
            .await,
    )
}

pub async fn set_skill_proficiency(
    State(state): State<Arc<AppState>>,
    Path((id, skill)): Path<(String, String)>,
    Json(req): Json<SkillProficiencyRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let skill = Skill::parse(&skill)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Unknown skill: {}", skill)))?;
    respond(
        state
            .character_service
            .set_skill_proficiency(id, skill, req.level)
            .await,
    )
}

pub async fn set_saving_throw(
    State(state): State<Arc<AppState>>,
    Path((id, ability)): Path<(String, String)>,
    Json(req): Json<SavingThrowRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let ability = parse_ability(&ability)?;
    respond(
        state
            .character_service
            .set_saving_throw_proficiency(id, ability, req.proficient)
            .await,
    )
}

pub async fn update_currency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(currency): Json<Currency>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.update_currency(id, currency).await)
}

pub async fn set_class_resource(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
    Json(req): Json<ClassResourceRequestDto>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let current = req.current.unwrap_or(req.max);
    respond(
        state
            .character_service
            .set_class_resource(id, &name, current, req.max)
            .await,
    )
}

pub async fn use_class_resource(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
    req: Option<Json<UseResourceRequestDto>>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let amount = req.map(|Json(req)| req.amount).unwrap_or(1);
    respond(
        state
            .character_service
            .use_class_resource(id, &name, amount)
            .await,
    )
}

pub async fn restore_class_resource(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.restore_class_resource(id, &name).await)
}

pub async fn add_class_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(entry): Json<ClassEntry>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.add_class_entry(id, entry).await)
}

pub async fn migrate_classes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    respond(state.character_service.migrate_classes(id).await)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::TestApp;

    #[tokio::test]
    async fn test_create_get_list_delete() {
        let app = TestApp::new().await;
        let id = app.create_character("Pike").await;

        let (status, body) = app.send("GET", &format!("/api/characters/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Pike");
        assert_eq!(body["characterClass"], "Wizard");
        assert_eq!(body["abilityModifiers"]["strength"], 0);

        let (_, list) = app.send("GET", "/api/characters", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = app
            .send("DELETE", &format!("/api/characters/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send("GET", &format!("/api/characters/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_ids_and_payloads() {
        let app = TestApp::new().await;
        let (status, body) = app.send("GET", "/api/characters/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid character ID");

        let (status, _) = app
            .send("POST", "/api/characters", Some(json!({ "name": "  " })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "DELETE",
                "/api/characters/00000000-0000-0000-0000-000000000000",
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_combat_endpoints() {
        let app = TestApp::new().await;
        let id = app.create_character("Grog").await;
        let base = format!("/api/characters/{}", id);

        let (status, body) = app
            .send(
                "PUT",
                &format!("{}/hit-points", base),
                Some(json!({ "current": 20, "max": 30 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hitPoints"], 20);
        assert_eq!(body["maxHitPoints"], 30);

        let (_, body) = app
            .send("POST", &format!("{}/damage", base), Some(json!({ "amount": 50 })))
            .await;
        assert_eq!(body["hitPoints"], 0);
        assert_eq!(body["isUnconscious"], true);

        let (_, body) = app
            .send("POST", &format!("{}/heal", base), Some(json!({ "amount": 5 })))
            .await;
        assert_eq!(body["hitPoints"], 5);

        let (status, _) = app
            .send("POST", &format!("{}/heal", base), Some(json!({ "amount": -5 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.send("POST", &format!("{}/long-rest", base), None).await;
        assert_eq!(body["hitPoints"], 30);
    }

    #[tokio::test]
    async fn test_sheet_endpoints() {
        let app = TestApp::new().await;
        let id = app.create_character("Scanlan").await;
        let base = format!("/api/characters/{}", id);

        let (status, body) = app
            .send(
                "PUT",
                &format!("{}/abilities/charisma", base),
                Some(json!({ "score": 20 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["abilityModifiers"]["charisma"], 5);

        let (status, _) = app
            .send(
                "PUT",
                &format!("{}/abilities/luck", base),
                Some(json!({ "score": 20 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(
                "PUT",
                &format!("{}/skills/performance", base),
                Some(json!({ "level": "expertise" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skillProficiencies"]["performance"], "expertise");

        let (_, body) = app
            .send(
                "PUT",
                &format!("{}/saving-throws/dexterity", base),
                Some(json!({ "proficient": true })),
            )
            .await;
        assert_eq!(body["savingThrowProficiencies"], json!(["dexterity"]));

        let (_, body) = app
            .send(
                "PUT",
                &format!("{}/currency", base),
                Some(json!({ "gold": 250, "platinum": 3 })),
            )
            .await;
        assert_eq!(body["currency"]["gold"], 250);
        assert_eq!(body["currency"]["copper"], 0);
    }

    #[tokio::test]
    async fn test_class_resource_endpoints() {
        let app = TestApp::new().await;
        let id = app.create_character("Vex").await;
        let base = format!("/api/characters/{}/resources/Bardic%20Inspiration", id);

        let (status, body) = app
            .send("PUT", &base, Some(json!({ "max": 3 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classResources"]["Bardic Inspiration"]["current"], 3);

        let (_, body) = app.send("POST", &format!("{}/use", base), None).await;
        assert_eq!(body["classResources"]["Bardic Inspiration"]["current"], 2);

        let (status, _) = app
            .send("POST", &format!("{}/use", base), Some(json!({ "amount": 5 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.send("POST", &format!("{}/restore", base), None).await;
        assert_eq!(body["classResources"]["Bardic Inspiration"]["current"], 3);

        let (status, _) = app
            .send(
                "POST",
                &format!("/api/characters/{}/resources/Rage/use", id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_multiclass_endpoints() {
        let app = TestApp::new().await;
        let id = app.create_character("Taryon").await;
        let base = format!("/api/characters/{}", id);

        let (status, body) = app.send("POST", &format!("{}/classes/migrate", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classes"][0]["name"], "Wizard");

        let (status, body) = app
            .send(
                "POST",
                &format!("{}/classes", base),
                Some(json!({ "name": "Fighter", "level": 2 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], 3);

        let (status, _) = app
            .send(
                "POST",
                &format!("{}/classes", base),
                Some(json!({ "name": "Rogue", "level": 18 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                &format!("{}/classes", base),
                Some(json!({ "name": "Wizard", "level": 4294967295u32 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, body) = app.send("GET", &base, None).await;
        assert_eq!(body["level"], 3);
    }
}
