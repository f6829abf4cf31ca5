//! Note API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::character_routes::parse_character_id;
use super::{error_response, parse_uuid};
use crate::application::dto::{CreateNoteRequestDto, NoteListQueryDto, UpdateNoteRequestDto};
use crate::application::services::NoteService;
use crate::domain::entities::{Note, NoteCategory};
use crate::domain::value_objects::NoteId;
use crate::infrastructure::state::AppState;

/// List a character's notes, optionally narrowed to one category
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    Query(query): Query<NoteListQueryDto>,
) -> Result<Json<Vec<Note>>, (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let category = match query.category.as_deref() {
        Some(raw) => Some(NoteCategory::parse(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("Unknown note category: {}", raw),
            )
        })?),
        None => None,
    };

    let notes = state
        .note_service
        .list_notes(character_id, category)
        .await
        .map_err(error_response)?;

    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<String>,
    Json(req): Json<CreateNoteRequestDto>,
) -> Result<(StatusCode, Json<Note>), (StatusCode, String)> {
    let character_id = parse_character_id(&character_id)?;
    let note = state
        .note_service
        .create_note(character_id, req.into())
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequestDto>,
) -> Result<Json<Note>, (StatusCode, String)> {
    let id = NoteId::from_uuid(parse_uuid(&id, "note")?);
    let note = state
        .note_service
        .update_note(id, req.into())
        .await
        .map_err(error_response)?;

    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = NoteId::from_uuid(parse_uuid(&id, "note")?);
    state
        .note_service
        .delete_note(id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::TestApp;

    #[tokio::test]
    async fn test_note_lifecycle_and_category_filter() {
        let app = TestApp::new().await;
        let character_id = app.create_character("Keyleth").await;
        let collection = format!("/api/characters/{}/notes", character_id);

        let (status, body) = app
            .send(
                "POST",
                &collection,
                Some(json!({ "title": "Vasselheim", "category": "location", "location": "Issylra" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["location"], "Issylra");
        let id = body["id"].as_str().unwrap().to_string();

        app.send("POST", &collection, Some(json!({ "title": "Shopping list" })))
            .await;

        let (_, all) = app.send("GET", &collection, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
        let (_, locations) = app
            .send("GET", &format!("{}?category=location", collection), None)
            .await;
        assert_eq!(locations.as_array().unwrap().len(), 1);
        let (status, _) = app
            .send("GET", &format!("{}?category=gossip", collection), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app
            .send(
                "PUT",
                &format!("/api/notes/{}", id),
                Some(json!({ "content": "Home of the Platinum Dragon's temple" })),
            )
            .await;
        assert_eq!(body["title"], "Vasselheim");
        assert_eq!(body["content"], "Home of the Platinum Dragon's temple");

        let (status, _) = app
            .send("DELETE", &format!("/api/notes/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send("PUT", "/api/notes/bogus", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
