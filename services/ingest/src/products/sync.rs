use async_trait::async_trait;
use chrono::Utc;

use shopsync_db::products::repositories::ProductRepository;
use shopsync_db::sync::models::WatermarkUpdate;
use shopsync_db::sync::repositories::SyncWatermarkRepository;

use super::transform::product_from_api;
use crate::connector::{Connector, SyncOutcome};
use crate::orders::sync::SyncOptions;
use crate::tiktok::client::ShopClient;

const SYNC_TYPE: &str = "products";

/// Paginated product catalogue sync. The upstream search has no reliable
/// modified-time filter, so every pass walks the full catalogue; the
/// watermark still gates concurrency and records progress.
pub struct ProductSyncer<R, S> {
    client: ShopClient,
    products: R,
    sync_repo: S,
    options: SyncOptions,
}

impl<R, S> ProductSyncer<R, S>
where
    R: ProductRepository,
    S: SyncWatermarkRepository,
{
    pub fn new(client: ShopClient, products: R, sync_repo: S, options: SyncOptions) -> Self {
        Self {
            client,
            products,
            sync_repo,
            options,
        }
    }

    /// Record the failure on the watermark. The caller returns the original
    /// error, so a failing mark_failed is only logged.
    async fn abort(&self, error: &str) {
        tracing::error!(error, "product sync aborted");
        if let Err(mark_err) = self.sync_repo.mark_failed(SYNC_TYPE, error).await {
            tracing::error!(error = %mark_err, "failed to record sync failure");
        }
    }
}

#[async_trait]
impl<R, S> Connector for ProductSyncer<R, S>
where
    R: ProductRepository,
    S: SyncWatermarkRepository,
{
    fn sync_type(&self) -> &str {
        SYNC_TYPE
    }

    async fn sync(&self) -> Result<SyncOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let watermark = self
            .sync_repo
            .acquire(SYNC_TYPE)
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

        if watermark.is_none() {
            tracing::info!("product sync already running, skipping");
            return Ok(SyncOutcome {
                sync_type: SYNC_TYPE.to_string(),
                upserted: 0,
                skipped: 0,
                full_sync: false,
            });
        }

        let started = Utc::now();
        tracing::info!("starting product sync pass");

        let mut upserted: usize = 0;
        let mut skipped: usize = 0;
        let mut page_token: Option<String> = None;

        'pages: loop {
            let page = match self.client.search_products(page_token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    self.abort(&e.to_string()).await;
                    return Err(Box::new(e));
                }
            };

            if page.records.is_empty() {
                break;
            }

            for raw in &page.records {
                let Some(product) = product_from_api(raw) else {
                    tracing::warn!("product record without id, skipping");
                    skipped += 1;
                    continue;
                };

                if let Err(e) = self.products.upsert(&product).await {
                    self.abort(&e.to_string()).await;
                    return Err(Box::new(e));
                }
                upserted += 1;

                if self.options.max_records.is_some_and(|max| upserted >= max) {
                    tracing::info!(max = upserted, "record cap reached");
                    break 'pages;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let update = WatermarkUpdate {
            last_sync_time: started,
            last_record_time: None,
            records_synced: upserted as i64,
            is_full_sync: true,
        };
        self.sync_repo
            .commit(SYNC_TYPE, &update)
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

        let outcome = SyncOutcome {
            sync_type: SYNC_TYPE.to_string(),
            upserted,
            skipped,
            full_sync: true,
        };
        tracing::info!(?outcome, "product sync completed");
        Ok(outcome)
    }
}
