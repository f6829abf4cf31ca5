//! HTTP REST API routes

mod cache_routes;
mod character_routes;
mod note_routes;
mod reference_routes;
mod relationship_routes;
mod transfer_routes;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::services::ServiceError;
use crate::infrastructure::export::TransferError;
use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        // Character routes
        .route(
            "/api/characters",
            get(character_routes::list_characters).post(character_routes::create_character),
        )
        .route(
            "/api/characters/{id}",
            get(character_routes::get_character)
                .put(character_routes::update_character)
                .delete(character_routes::delete_character),
        )
        .route(
            "/api/characters/{id}/hit-points",
            put(character_routes::set_hit_points),
        )
        .route(
            "/api/characters/{id}/damage",
            post(character_routes::apply_damage),
        )
        .route("/api/characters/{id}/heal", post(character_routes::heal))
        .route(
            "/api/characters/{id}/long-rest",
            post(character_routes::long_rest),
        )
        .route(
            "/api/characters/{id}/abilities/{ability}",
            put(character_routes::set_ability_score),
        )
        .route(
            "/api/characters/{id}/skills/{skill}",
            put(character_routes::set_skill_proficiency),
        )
        .route(
            "/api/characters/{id}/saving-throws/{ability}",
            put(character_routes::set_saving_throw),
        )
        .route(
            "/api/characters/{id}/currency",
            put(character_routes::update_currency),
        )
        .route(
            "/api/characters/{id}/resources/{name}",
            put(character_routes::set_class_resource),
        )
        .route(
            "/api/characters/{id}/resources/{name}/use",
            post(character_routes::use_class_resource),
        )
        .route(
            "/api/characters/{id}/resources/{name}/restore",
            post(character_routes::restore_class_resource),
        )
        .route(
            "/api/characters/{id}/classes",
            post(character_routes::add_class_entry),
        )
        .route(
            "/api/characters/{id}/classes/migrate",
            post(character_routes::migrate_classes),
        )
        // Relationship routes
        .route(
            "/api/characters/{id}/relationships",
            get(relationship_routes::list_relationships)
                .post(relationship_routes::create_relationship),
        )
        .route(
            "/api/relationships/{id}",
            put(relationship_routes::update_relationship)
                .delete(relationship_routes::delete_relationship),
        )
        .route(
            "/api/relationships/{id}/level",
            post(relationship_routes::adjust_level),
        )
        // Note routes
        .route(
            "/api/characters/{id}/notes",
            get(note_routes::list_notes).post(note_routes::create_note),
        )
        .route(
            "/api/notes/{id}",
            put(note_routes::update_note).delete(note_routes::delete_note),
        )
        // Reference routes
        .route("/api/reference/spells", get(reference_routes::list_spells))
        .route(
            "/api/reference/monsters",
            get(reference_routes::list_monsters),
        )
        .route("/api/reference/feats", get(reference_routes::list_feats))
        .route(
            "/api/reference/backgrounds",
            get(reference_routes::list_backgrounds),
        )
        .route(
            "/api/reference/magic-items",
            get(reference_routes::list_magic_items),
        )
        .route(
            "/api/characters/{id}/favorites",
            get(reference_routes::list_favorites),
        )
        .route(
            "/api/characters/{id}/favorites/{kind}/{item_id}",
            post(reference_routes::toggle_favorite),
        )
        // Import/export routes
        .route(
            "/api/characters/{id}/export",
            get(transfer_routes::export_character),
        )
        .route("/api/import", post(transfer_routes::import_character))
        // Cache routes
        .route("/api/cache/stats", get(cache_routes::get_stats))
        .route("/api/cache/purge", post(cache_routes::purge_expired))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Pick a status code for a service failure
pub(crate) fn error_response(error: anyhow::Error) -> (StatusCode, String) {
    let status = error
        .chain()
        .find_map(|cause| {
            if let Some(service_error) = cause.downcast_ref::<ServiceError>() {
                return Some(match service_error {
                    ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                    ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                });
            }
            match cause.downcast_ref::<TransferError>() {
                Some(TransferError::Unrecognized(_)) => Some(StatusCode::UNPROCESSABLE_ENTITY),
                _ => None,
            }
        })
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {:#}", error);
        (status, format!("{:#}", error))
    } else {
        (status, error.to_string())
    }
}

pub(crate) fn parse_uuid(id: &str, what: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} ID", what)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::aggregates::ReferenceCatalog;
    use crate::domain::entities::{Monster, Spell};
    use crate::infrastructure::cache::FileCache;
    use crate::infrastructure::config::{AppConfig, CacheConfig, StorageConfig};
    use crate::infrastructure::persistence::Repositories;

    pub struct TestApp {
        pub state: Arc<AppState>,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let cache_config = CacheConfig {
                directory: dir.path().to_path_buf(),
                ..Default::default()
            };
            let config = AppConfig {
                storage: StorageConfig {
                    backend: "memory".to_string(),
                    sqlite_path: String::new(),
                },
                cache: cache_config.clone(),
                assets_dir: dir.path().to_path_buf(),
                server_port: 0,
            };
            let cache = Arc::new(FileCache::new(cache_config).await.unwrap());
            let repositories = Repositories::new(
                Arc::new(crate::infrastructure::storage::InMemoryKeyValueStore::new()),
                Some(cache.clone()),
            );

            let spells: Vec<Spell> = serde_json::from_str(
                r#"[
                    {"name": "Fireball", "level": 3, "classes": ["Wizard"]},
                    {"name": "Bless", "level": 1, "classes": ["Cleric", "Paladin"]}
                ]"#,
            )
            .unwrap();
            let monsters: Vec<Monster> = serde_json::from_str(
                r#"[{"name": "Goblin", "challengeRating": "1/4"}, {"name": "Adult Red Dragon", "challengeRating": "17"}]"#,
            )
            .unwrap();
            let catalog = Arc::new(ReferenceCatalog::new(spells, vec![], vec![], monsters, vec![]));

            Self {
                state: Arc::new(AppState::from_parts(config, repositories, catalog, cache)),
                _dir: dir,
            }
        }

        /// Send a request and return the status with the body parsed as JSON
        /// (or as a JSON string when it is not JSON)
        pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => request
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string())),
                None => request.body(Body::empty()),
            }
            .unwrap();
            self.dispatch(request).await
        }

        pub async fn send_raw(&self, method: &str, uri: &str, body: String) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body))
                .unwrap();
            self.dispatch(request).await
        }

        async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = create_routes()
                .with_state(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let text = String::from_utf8(bytes.to_vec()).unwrap();
            let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
            (status, value)
        }

        /// Create a character through the API and return its id
        pub async fn create_character(&self, name: &str) -> String {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/characters",
                    Some(serde_json::json!({
                        "name": name,
                        "race": "Human",
                        "class": "Wizard",
                        "background": "Sage",
                        "alignment": "Neutral"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["id"].as_str().unwrap().to_string()
        }
    }
}
