pub mod handlers;
pub mod responses;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kpis/summary", get(handlers::get_summary))
        .route("/api/kpis/trends", get(handlers::get_trends))
}
