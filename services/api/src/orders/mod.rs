pub mod handlers;
pub mod responses;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(handlers::list_orders))
        .route("/api/orders/{id}", get(handlers::get_order))
}
