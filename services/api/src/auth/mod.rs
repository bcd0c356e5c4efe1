pub mod handlers;
pub mod responses;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/status", get(handlers::get_auth_status))
        .route("/api/auth/token", post(handlers::save_token))
}
