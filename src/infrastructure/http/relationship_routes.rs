//! Relationship API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::character_routes::parse_character_id;
use super::{error_response, parse_uuid};
use crate::application::dto::{
    AdjustLevelRequestDto, CreateRelationshipRequestDto, RelationshipResponseDto,
    UpdateRelationshipRequestDto,
};
use crate::application::services::RelationshipService;
use crate::domain::value_objects::RelationshipId;
use crate::infrastructure::state::AppState;

fn parse_relationship_id(id: &str) -> Result<RelationshipId, (StatusCode, String)> {
    parse_uuid(id, "relationship").map(RelationshipId::from_uuid)
}

/// List the relationships of a character
pub async fn list_relationships(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
) -> Result<Json<Vec<RelationshipResponseDto>>, (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let relationships = state
        .relationship_service
        .list_relationships(character_id)
        .await
        .map_err(error_response)?;

    Ok(Json(
        relationships
            .into_iter()
            .map(RelationshipResponseDto::from)
            .collect(),
    ))
}

/// Record a new NPC relationship
pub async fn create_relationship(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    Json(req): Json<CreateRelationshipRequestDto>,
) -> Result<(StatusCode, Json<RelationshipResponseDto>), (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let relationship = state
        .relationship_service
        .create_relationship(character_id, req.into())
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(RelationshipResponseDto::from(relationship)),
    ))
}

pub async fn update_relationship(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRelationshipRequestDto>,
) -> Result<Json<RelationshipResponseDto>, (StatusCode, String)> {
    let id = parse_relationship_id(&id)?;
    let relationship = state
        .relationship_service
        .update_relationship(id, req.into())
        .await
        .map_err(error_response)?;

    Ok(Json(RelationshipResponseDto::from(relationship)))
}

/// Nudge the relationship level up or down
pub async fn adjust_level(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustLevelRequestDto>,
) -> Result<Json<RelationshipResponseDto>, (StatusCode, String)> {
    let id = parse_relationship_id(&id)?;
    let relationship = state
        .relationship_service
        .adjust_level(id, req.delta)
        .await
        .map_err(error_response)?;

    Ok(Json(RelationshipResponseDto::from(relationship)))
}

pub async fn delete_relationship(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_relationship_id(&id)?;
    state
        .relationship_service
        .delete_relationship(id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
