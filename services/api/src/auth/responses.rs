use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub shop_id: Option<String>,
    pub shop_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SavedTokenResponse {
    pub shop_id: String,
    pub expires_at: DateTime<Utc>,
}
