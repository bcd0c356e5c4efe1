use axum::extract::State;
use axum::Json;
use shopsync_common::error::ShopError;
use shopsync_db::analytics::models::AnalyticsSnapshot;

use crate::error::ApiError;
use crate::AppState;

/// Most recent performance overview captured by the ingest service.
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSnapshot>, ApiError> {
    let snapshot = state
        .analytics_repo
        .latest()
        .await?
        .ok_or_else(|| ShopError::NotFound("no analytics snapshot captured yet".to_string()))?;
    Ok(Json(snapshot))
}
