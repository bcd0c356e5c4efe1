use axum::extract::{Path, Query, State};
use axum::Json;
use shopsync_common::error::ShopError;
use shopsync_db::orders::models::{Order, OrderFilter};
use shopsync_db::orders::repositories::OrderRepository;

use crate::error::ApiError;
use crate::orders::responses::OrderListResponse;
use crate::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<OrderListResponse>, ApiError> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(ShopError::Validation(
                "start_date must not be after end_date".to_string(),
            )
            .into());
        }
    }

    let data = state.order_repo.list(&filter).await?;
    let count = data.len();
    Ok(Json(OrderListResponse { data, count }))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .order_repo
        .get(&id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("order {id} not found")))?;
    Ok(Json(order))
}
