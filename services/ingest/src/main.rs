mod analytics;
mod connector;
mod orders;
mod products;
#[cfg(test)]
mod testsupport;
mod tiktok;
mod window;

use shopsync_config::init_tracing;
use shopsync_db::tokens::models::TokenStatus;
use shopsync_db::tokens::pg_repository::PgTokenRepository;

use crate::analytics::sync::AnalyticsSyncer;
use crate::connector::Connector;
use crate::orders::sync::{OrderSyncer, SyncOptions};
use crate::products::sync::ProductSyncer;
use crate::tiktok::client::{ShopClient, ShopClientConfig};

#[tokio::main]
async fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    tracing::info!(service = "shopsync-ingest", "starting");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = shopsync_db::create_pool(&database_url)
        .await
        .expect("failed to connect to database");

    let Some(shop_config) = ShopClientConfig::from_env() else {
        tracing::info!("no shop API credentials found, nothing to sync");
        return;
    };

    // Token from the environment wins; otherwise use the stored one
    let access_token = match std::env::var("TIKTOK_ACCESS_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            let token_repo = PgTokenRepository::new(pool.clone());
            match token_repo
                .status(shop_config.shop_id.as_deref())
                .await
                .expect("failed to read token status")
            {
                TokenStatus::Authenticated(token) => token.access_token,
                TokenStatus::NotAuthenticated => {
                    tracing::error!("no valid access token, run the auth flow first");
                    return;
                }
            }
        }
    };

    let options = SyncOptions {
        force_full: std::env::var("SYNC_FORCE_FULL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
        max_records: std::env::var("SYNC_MAX_RECORDS")
            .ok()
            .and_then(|v| v.parse().ok()),
    };

    let mut client =
        ShopClient::new(shop_config, access_token).expect("failed to create shop client");
    if let Err(e) = client.discover_shop().await {
        tracing::error!(error = %e, "failed to resolve authorized shop");
        return;
    }

    let order_syncer = OrderSyncer::new(
        client.clone(),
        shopsync_db::orders::pg_repository::PgOrderRepository::new(pool.clone()),
        shopsync_db::sync::pg_repository::PgSyncRepository::new(pool.clone()),
        options,
    );
    run(&order_syncer).await;

    let product_syncer = ProductSyncer::new(
        client.clone(),
        shopsync_db::products::pg_repository::PgProductRepository::new(pool.clone()),
        shopsync_db::sync::pg_repository::PgSyncRepository::new(pool.clone()),
        options,
    );
    run(&product_syncer).await;

    let analytics_syncer = AnalyticsSyncer::new(
        client,
        shopsync_db::analytics::pg_repository::PgAnalyticsRepository::new(pool.clone()),
        shopsync_db::sync::pg_repository::PgSyncRepository::new(pool),
    );
    run(&analytics_syncer).await;

    tracing::info!("ingest service finished");
}

async fn run(connector: &dyn Connector) {
    match connector.sync().await {
        Ok(outcome) => {
            tracing::info!(
                sync_type = outcome.sync_type,
                upserted = outcome.upserted,
                skipped = outcome.skipped,
                full_sync = outcome.full_sync,
                "sync completed"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "sync failed");
        }
    }
}
