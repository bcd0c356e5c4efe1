use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored platform OAuth credentials, one row per shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub id: Uuid,
    pub shop_id: String,
    pub shop_name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token material to persist after an authorization exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOAuthToken {
    pub shop_id: String,
    pub shop_name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds, as reported by the platform.
    pub expires_in: i64,
}

/// Outcome of a token lookup. Missing or expired tokens are a state, not an
/// error, so callers match instead of catching.
#[derive(Debug, Clone)]
pub enum TokenStatus {
    Authenticated(OAuthToken),
    NotAuthenticated,
}

impl TokenStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, TokenStatus::Authenticated(_))
    }
}
