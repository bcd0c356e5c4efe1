use axum::extract::State;
use axum::Json;
use shopsync_db::orders::repositories::OrderRepository;
use shopsync_db::products::repositories::ProductRepository;
use shopsync_db::sync::repositories::SyncWatermarkRepository;

use crate::error::ApiError;
use crate::sync::responses::{SyncCounts, SyncStatusResponse};
use crate::AppState;

const SYNC_DOMAINS: [&str; 3] = ["orders", "products", "analytics"];

pub async fn get_sync_status(
    State(state): State<AppState>,
) -> Result<Json<SyncStatusResponse>, ApiError> {
    let mut watermarks = Vec::with_capacity(SYNC_DOMAINS.len());
    for domain in SYNC_DOMAINS {
        if let Some(wm) = state.sync_repo.get(domain).await? {
            watermarks.push(wm);
        }
    }

    let counts = SyncCounts {
        orders: state.order_repo.count().await?,
        products: state.product_repo.count().await?,
    };

    Ok(Json(SyncStatusResponse { watermarks, counts }))
}
