use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::tokens::models::{NewOAuthToken, OAuthToken, TokenStatus};
use shopsync_common::error::{ShopError, ShopResult};

const COLUMNS: &str =
    "id, shop_id, shop_name, access_token, refresh_token, expires_at, created_at, updated_at";

/// Tokens within this many minutes of expiry are treated as expired, so a
/// sync pass never starts with a token about to lapse mid-pass.
const EXPIRY_BUFFER_MINS: i64 = 5;

#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> ShopResult<OAuthToken> {
        Ok(OAuthToken {
            id: row.get("id"),
            shop_id: row.get("shop_id"),
            shop_name: row.get("shop_name"),
            access_token: row.get("access_token"),
            refresh_token: row.get("refresh_token"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Upsert token material for a shop (one row per shop_id).
    pub async fn save(&self, token: &NewOAuthToken) -> ShopResult<OAuthToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(token.expires_in);

        let row = sqlx::query(&format!(
            "insert into oauth_tokens
             (id, shop_id, shop_name, access_token, refresh_token, expires_at)
             values ($1, $2, $3, $4, $5, $6)
             on conflict (shop_id) do update set
               shop_name = excluded.shop_name,
               access_token = excluded.access_token,
               refresh_token = excluded.refresh_token,
               expires_at = excluded.expires_at,
               updated_at = now()
             returning {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&token.shop_id)
        .bind(&token.shop_name)
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        Self::map_row(row)
    }

    /// Look up a usable token. `shop_id = None` returns the first shop's
    /// token (single-shop deployments).
    pub async fn status(&self, shop_id: Option<&str>) -> ShopResult<TokenStatus> {
        let row = sqlx::query(&format!(
            "select {COLUMNS} from oauth_tokens
             where ($1::text is null or shop_id = $1)
             order by created_at
             limit 1"
        ))
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        let token = match row {
            Some(r) => Self::map_row(r)?,
            None => return Ok(TokenStatus::NotAuthenticated),
        };

        if token.expires_at <= Utc::now() + Duration::minutes(EXPIRY_BUFFER_MINS) {
            return Ok(TokenStatus::NotAuthenticated);
        }

        Ok(TokenStatus::Authenticated(token))
    }
}
