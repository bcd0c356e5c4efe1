use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use shopsync_common::error::ShopError;
use shopsync_db::tokens::models::{NewOAuthToken, TokenStatus};

use crate::auth::responses::{AuthStatusResponse, SavedTokenResponse};
use crate::error::ApiError;
use crate::AppState;

pub async fn get_auth_status(
    State(state): State<AppState>,
) -> Result<Json<AuthStatusResponse>, ApiError> {
    let response = match state.token_repo.status(None).await? {
        TokenStatus::Authenticated(token) => AuthStatusResponse {
            authenticated: true,
            shop_id: Some(token.shop_id),
            shop_name: token.shop_name,
            expires_at: Some(token.expires_at),
        },
        TokenStatus::NotAuthenticated => AuthStatusResponse {
            authenticated: false,
            shop_id: None,
            shop_name: None,
            expires_at: None,
        },
    };
    Ok(Json(response))
}

/// Store token material obtained from the platform's authorization flow.
pub async fn save_token(
    State(state): State<AppState>,
    Json(request): Json<NewOAuthToken>,
) -> Result<(StatusCode, Json<SavedTokenResponse>), ApiError> {
    if request.shop_id.trim().is_empty() {
        return Err(ShopError::Validation("shop_id must not be empty".to_string()).into());
    }
    if request.access_token.trim().is_empty() {
        return Err(ShopError::Validation("access_token must not be empty".to_string()).into());
    }
    if request.expires_in <= 0 {
        return Err(ShopError::Validation("expires_in must be positive".to_string()).into());
    }

    let token = state.token_repo.save(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SavedTokenResponse {
            shop_id: token.shop_id,
            expires_at: token.expires_at,
        }),
    ))
}
