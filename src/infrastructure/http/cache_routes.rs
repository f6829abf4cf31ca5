//! File cache maintenance routes

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::cache::CacheStats;
use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub removed: usize,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheStats>, (StatusCode, String)> {
    let stats = state
        .cache
        .stats()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(stats))
}

/// Drop every cache entry past its TTL
pub async fn purge_expired(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PurgeResponse>, (StatusCode, String)> {
    let removed = state
        .cache
        .purge_expired()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(PurgeResponse { removed }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::TestApp;

    #[tokio::test]
    async fn test_stats_reflect_mirrored_characters() {
        let app = TestApp::new().await;
        app.create_character("Trinket").await;

        let (status, stats) = app.send("GET", "/api/cache/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["entries"], 1);
        assert_eq!(stats["overDiskBudget"], false);

        let (status, body) = app.send("POST", "/api/cache/purge", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 0);
    }
}
