use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shopsync_common::error::ShopError;

pub struct ApiError(pub ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ShopError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ShopError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ShopError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
