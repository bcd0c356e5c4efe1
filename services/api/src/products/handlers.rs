use axum::extract::{Path, Query, State};
use axum::Json;
use shopsync_common::error::ShopError;
use shopsync_db::products::models::{Product, ProductFilter};
use shopsync_db::products::repositories::ProductRepository;

use crate::error::ApiError;
use crate::products::responses::ProductListResponse;
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let data = state.product_repo.list(&filter).await?;
    let count = data.len();
    Ok(Json(ProductListResponse { data, count }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .product_repo
        .get(&id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("product {id} not found")))?;
    Ok(Json(product))
}
