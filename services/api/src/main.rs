mod analytics;
mod auth;
mod error;
mod kpi;
mod orders;
mod products;
mod sync;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shopsync_common::types::ServiceInfo;
use shopsync_config::{init_tracing, AppConfig};
use shopsync_db::analytics::pg_repository::PgAnalyticsRepository;
use shopsync_db::kpi::pg_repository::PgKpiRepository;
use shopsync_db::orders::pg_repository::PgOrderRepository;
use shopsync_db::products::pg_repository::PgProductRepository;
use shopsync_db::sync::pg_repository::PgSyncRepository;
use shopsync_db::tokens::pg_repository::PgTokenRepository;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub order_repo: PgOrderRepository,
    pub product_repo: PgProductRepository,
    pub sync_repo: PgSyncRepository,
    pub token_repo: PgTokenRepository,
    pub kpi_repo: PgKpiRepository,
    pub analytics_repo: PgAnalyticsRepository,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("shopsync-api"))
}

async fn metrics() -> impl IntoResponse {
    let body = "\
# HELP shopsync_up Service up indicator\n\
# TYPE shopsync_up gauge\n\
shopsync_up 1\n\
# HELP shopsync_info Service info\n\
# TYPE shopsync_info gauge\n\
shopsync_info{service=\"shopsync-api\",version=\"0.1.0\"} 1\n";

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .merge(orders::router())
        .merge(products::router())
        .merge(kpi::router())
        .merge(sync::router())
        .merge(analytics::router())
        .merge(auth::router())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    tracing::info!(service = "shopsync-api", "starting");

    let pool = shopsync_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let state = AppState {
        order_repo: PgOrderRepository::new(pool.clone()),
        product_repo: PgProductRepository::new(pool.clone()),
        sync_repo: PgSyncRepository::new(pool.clone()),
        token_repo: PgTokenRepository::new(pool.clone()),
        kpi_repo: PgKpiRepository::new(pool.clone()),
        analytics_repo: PgAnalyticsRepository::new(pool),
    };

    let app = build_router(state).layer(cors_layer(&config.cors_origins));
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    use shopsync_db::orders::models::Order;
    use shopsync_db::orders::repositories::OrderRepository;

    async fn ensure_tables(pool: &PgPool) {
        for ddl in [
            "create table if not exists orders (
               id text primary key,
               order_number text not null,
               status text not null,
               created_time timestamptz not null,
               paid_time timestamptz,
               shipped_time timestamptz,
               delivered_time timestamptz,
               total_amount numeric(10,2) not null default 0,
               currency text not null default 'GBP',
               item_count integer not null default 0,
               customer_id text,
               shipping_provider text,
               tracking_number text,
               raw_data jsonb,
               synced_at timestamptz not null default now()
             )",
            "create table if not exists products (
               id text primary key,
               name text not null,
               sku text,
               status text not null,
               price numeric(10,2) not null default 0,
               stock_quantity integer not null default 0,
               category text,
               brand text,
               image_url text,
               raw_data jsonb,
               synced_at timestamptz not null default now()
             )",
            "create table if not exists sync_watermarks (
               sync_type text primary key,
               last_sync_time timestamptz,
               last_record_time timestamptz,
               records_synced bigint not null default 0,
               is_full_sync boolean not null default false,
               status text not null default 'idle',
               error_message text,
               created_at timestamptz not null default now(),
               updated_at timestamptz not null default now()
             )",
            "create table if not exists oauth_tokens (
               id uuid primary key,
               shop_id text not null unique,
               shop_name text,
               access_token text not null,
               refresh_token text not null,
               expires_at timestamptz not null,
               created_at timestamptz not null default now(),
               updated_at timestamptz not null default now()
             )",
            "create table if not exists analytics_snapshots (
               id uuid primary key,
               start_date date not null,
               end_date date not null,
               payload jsonb not null,
               captured_at timestamptz not null default now(),
               unique (start_date, end_date)
             )",
        ] {
            sqlx::query(ddl).execute(pool).await.expect("create table");
        }
    }

    async fn test_state() -> Option<(AppState, PgPool)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = shopsync_db::create_pool(&url)
            .await
            .expect("db should connect");
        ensure_tables(&pool).await;
        let state = AppState {
            order_repo: PgOrderRepository::new(pool.clone()),
            product_repo: PgProductRepository::new(pool.clone()),
            sync_repo: PgSyncRepository::new(pool.clone()),
            token_repo: PgTokenRepository::new(pool.clone()),
            kpi_repo: PgKpiRepository::new(pool.clone()),
            analytics_repo: PgAnalyticsRepository::new(pool.clone()),
        };
        Some((state, pool))
    }

    fn sample_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            order_number: id.to_string(),
            status: "COMPLETED".to_string(),
            created_time: Utc::now(),
            paid_time: None,
            shipped_time: None,
            delivered_time: None,
            total_amount: Decimal::new(4200, 2),
            currency: "GBP".to_string(),
            item_count: 1,
            customer_id: Some("buyer-1".to_string()),
            shipping_provider: None,
            tracking_number: None,
            raw_data: serde_json::json!({"id": id}),
            synced_at: Utc::now(),
        }
    }

    async fn read_body(resp: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── Health / Info ───────────────────────────────────────────────

    #[tokio::test]
    async fn health_returns_ok() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn info_returns_service_name() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert_eq!(body["name"], "shopsync-api");
    }

    // ── Orders ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn orders_list_returns_data_and_count() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let id = format!("api-{}", Uuid::new_v4());
        state.order_repo.upsert(&sample_order(&id)).await.unwrap();

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/orders?status=COMPLETED")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert!(body["count"].as_u64().unwrap() >= 1);
        assert!(body["data"].is_array());
    }

    #[tokio::test]
    async fn orders_get_returns_order() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let id = format!("api-{}", Uuid::new_v4());
        state.order_repo.upsert(&sample_order(&id)).await.unwrap();

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get(format!("/api/orders/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert_eq!(body["id"], id);
        assert_eq!(body["status"], "COMPLETED");
    }

    #[tokio::test]
    async fn orders_get_missing_returns_404() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/orders/no-such-order")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = read_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("no-such-order"));
    }

    #[tokio::test]
    async fn orders_list_inverted_range_returns_400() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get(
                    "/api/orders?start_date=2024-02-01T00:00:00Z&end_date=2024-01-01T00:00:00Z",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── Products ────────────────────────────────────────────────────

    #[tokio::test]
    async fn products_get_missing_returns_404() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/products/no-such-product")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // ── KPIs ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn kpi_summary_returns_contract_fields() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/kpis/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        let data = &body["data"];
        for field in [
            "total_orders",
            "total_gmv",
            "estimated_net_revenue",
            "total_items_sold",
            "average_order_value",
            "completed_orders",
            "pending_orders",
            "cancelled_orders",
            "unique_customers",
        ] {
            assert!(
                data.get(field).is_some(),
                "field '{field}' missing from summary"
            );
        }
        assert!(body["start_date"].as_str().is_some());
        assert!(body["end_date"].as_str().is_some());
    }

    #[tokio::test]
    async fn kpi_trends_rejects_bad_days() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/kpis/trends?days=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = read_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("days"));
    }

    // ── Sync status ─────────────────────────────────────────────────

    #[tokio::test]
    async fn sync_status_returns_counts_and_watermarks() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/sync/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert!(body["watermarks"].is_array());
        assert!(body["counts"]["orders"].as_i64().is_some());
        assert!(body["counts"]["products"].as_i64().is_some());
    }

    // ── Auth ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn auth_token_round_trip() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let shop = format!("shop-{}", Uuid::new_v4());

        let app = build_router(state.clone());
        let body = serde_json::json!({
            "shop_id": shop,
            "shop_name": "Test Shop",
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 86400
        });
        let resp = app
            .oneshot(
                Request::post("/api/auth/token")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let resp_body = read_body(resp).await;
        assert_eq!(resp_body["shop_id"], shop);

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/auth/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let status_body = read_body(resp).await;
        assert_eq!(status_body["authenticated"], true);
    }

    #[tokio::test]
    async fn auth_token_empty_shop_id_returns_400() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let body = serde_json::json!({
            "shop_id": "",
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 86400
        });
        let resp = app
            .oneshot(
                Request::post("/api/auth/token")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp_body = read_body(resp).await;
        assert!(resp_body["error"].as_str().unwrap().contains("shop_id"));
    }

    #[tokio::test]
    async fn auth_token_nonpositive_expiry_returns_400() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let app = build_router(state);
        let body = serde_json::json!({
            "shop_id": "shop-x",
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 0
        });
        let resp = app
            .oneshot(
                Request::post("/api/auth/token")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── Analytics ───────────────────────────────────────────────────

    #[tokio::test]
    async fn analytics_overview_returns_latest_snapshot() {
        let (state, _pool) = match test_state().await {
            Some(s) => s,
            None => return,
        };
        let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        state
            .analytics_repo
            .upsert(start, end, &serde_json::json!({"gmv": "99.00"}))
            .await
            .unwrap();

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::get("/api/analytics/overview")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert!(body["payload"].is_object());
        assert!(body["captured_at"].as_str().is_some());
    }
}
