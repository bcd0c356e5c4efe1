use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{ApiEnvelope, AuthorizedShops, RecordPage};
use super::signing::{canonical_body, RequestSigner};

pub const DEFAULT_BASE_URL: &str = "https://open-api.tiktokglobalshop.com";

#[derive(Debug, Clone)]
pub struct ShopClientConfig {
    pub base_url: String,
    pub app_key: String,
    pub app_secret: String,
    pub shop_id: Option<String>,
    pub shop_cipher: Option<String>,
    pub page_size: u32,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl ShopClientConfig {
    /// Load shop API config from environment.
    ///
    /// Returns `None` if the app credentials (key / secret) are missing, which
    /// means the upstream integration is not configured.
    pub fn from_env() -> Option<Self> {
        let app_key = std::env::var("TIKTOK_APP_KEY").ok()?;
        let app_secret = std::env::var("TIKTOK_APP_SECRET").ok()?;

        let base_url = std::env::var("TIKTOK_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let shop_id = std::env::var("TIKTOK_SHOP_ID").ok();
        let shop_cipher = std::env::var("TIKTOK_SHOP_CIPHER").ok();
        let page_size = std::env::var("TIKTOK_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);
        let max_retries = std::env::var("TIKTOK_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("TIKTOK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Some(Self {
            base_url,
            app_key,
            app_secret,
            shop_id,
            shop_cipher,
            page_size,
            max_retries,
            timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShopClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("unexpected payload: {0}")]
    PayloadError(String),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Authenticated client for the shop platform's open API. Every request is
/// signed; the access token travels both as a query parameter and in the
/// `x-tts-access-token` header.
#[derive(Clone)]
pub struct ShopClient {
    client: Client,
    config: ShopClientConfig,
    signer: RequestSigner,
    access_token: String,
}

impl ShopClient {
    pub fn new(config: ShopClientConfig, access_token: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let signer = RequestSigner::new(config.app_secret.clone());
        Ok(Self {
            client,
            config,
            signer,
            access_token,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Shops this app is authorized for.
    pub async fn get_authorized_shops(&self) -> Result<AuthorizedShops, ShopClientError> {
        self.request_with_retry(Method::GET, "/authorization/202309/shops", Vec::new(), None)
            .await
    }

    /// Adopt the first authorized shop's identity when no cipher was
    /// configured. Order and product calls require the cipher.
    pub async fn discover_shop(&mut self) -> Result<(), ShopClientError> {
        if self.config.shop_cipher.is_some() {
            return Ok(());
        }

        let authorized = self.get_authorized_shops().await?;
        let Some(shop) = authorized.shops.first() else {
            tracing::warn!("no authorized shops returned, continuing without cipher");
            return Ok(());
        };

        if let Some(id) = shop["id"].as_str() {
            self.config.shop_id = Some(id.to_string());
        }
        self.config.shop_cipher = shop["cipher"].as_str().map(str::to_string);
        tracing::info!(shop_id = ?self.config.shop_id, "adopted authorized shop");
        Ok(())
    }

    /// One page of the order search, newest records last within the window.
    /// `window` bounds order creation time; `page_token` resumes a search.
    pub async fn search_orders(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        page_token: Option<&str>,
    ) -> Result<RecordPage, ShopClientError> {
        let mut params = self.shop_params();
        params.push(("page_size".to_string(), self.config.page_size.to_string()));
        params.push(("sort_field".to_string(), "create_time".to_string()));
        params.push(("sort_order".to_string(), "ASC".to_string()));
        if let Some(token) = page_token {
            params.push(("page_token".to_string(), token.to_string()));
        }

        let mut body = serde_json::Map::new();
        if let Some((from, to)) = window {
            body.insert("create_time_from".to_string(), from.timestamp().into());
            body.insert("create_time_to".to_string(), to.timestamp().into());
        }

        self.request_with_retry(
            Method::POST,
            "/order/202309/orders/search",
            params,
            Some(body.into()),
        )
        .await
    }

    /// One page of the product search. Products have no reliable modified
    /// timestamp upstream, so there is no window parameter.
    pub async fn search_products(
        &self,
        page_token: Option<&str>,
    ) -> Result<RecordPage, ShopClientError> {
        let mut params = self.shop_params();
        params.push(("page_size".to_string(), self.config.page_size.to_string()));
        if let Some(token) = page_token {
            params.push(("page_token".to_string(), token.to_string()));
        }

        self.request_with_retry(Method::POST, "/product/202502/products/search", params, None)
            .await
    }

    /// Shop performance overview (GMV, orders, conversion) for a date range.
    /// Returned verbatim; dates are `YYYY-MM-DD`.
    pub async fn shop_performance_overview(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<serde_json::Value, ShopClientError> {
        let mut params = self.shop_params();
        params.push(("start_date".to_string(), start_date.to_string()));
        params.push(("end_date".to_string(), end_date.to_string()));
        params.push(("currency".to_string(), "LOCAL".to_string()));

        self.request_with_retry(
            Method::GET,
            "/analytics/202510/shop/performance/overview",
            params,
            None,
        )
        .await
    }

    fn shop_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(shop_id) = &self.config.shop_id {
            params.push(("shop_id".to_string(), shop_id.clone()));
        }
        if let Some(cipher) = &self.config.shop_cipher {
            params.push(("shop_cipher".to_string(), cipher.clone()));
        }
        params
    }

    /// Sign and send a request, retrying transient failures with exponential
    /// backoff. 429 honors Retry-After, 5xx retries, other 4xx fails fast. A
    /// non-zero envelope code also fails fast.
    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut params: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ShopClientError> {
        params.push(("app_key".to_string(), self.config.app_key.clone()));

        // The signed body bytes are the transmitted body bytes.
        let body_str = if method == Method::GET {
            String::new()
        } else {
            canonical_body(body.as_ref())
                .map_err(|e| ShopClientError::PayloadError(e.to_string()))?
        };

        let url = format!("{}{}", self.config.base_url, path);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, path, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            // Re-sign per attempt so the timestamp stays fresh.
            let sig = self.signer.sign(path, &params, &body_str);
            let mut query = params.clone();
            query.push(("sign".to_string(), sig.sign));
            query.push(("timestamp".to_string(), sig.timestamp));
            query.push(("access_token".to_string(), self.access_token.clone()));

            let mut request = self
                .client
                .request(method.clone(), &url)
                .query(&query)
                .header("x-tts-access-token", &self.access_token);
            if method != Method::GET {
                request = request
                    .header("Content-Type", "application/json")
                    .body(body_str.clone());
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(ShopClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                let envelope: ApiEnvelope<T> = response.json().await?;
                if envelope.code != 0 {
                    return Err(ShopClientError::ApiError {
                        code: envelope.code,
                        message: envelope.message,
                    });
                }
                return envelope.data.ok_or_else(|| {
                    ShopClientError::PayloadError("missing data in response".to_string())
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ShopClientError::HttpError { status, body });
        }

        Err(ShopClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
