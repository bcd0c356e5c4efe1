use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shopsync_db::orders::repositories::OrderRepository;
use shopsync_db::sync::models::WatermarkUpdate;
use shopsync_db::sync::repositories::SyncWatermarkRepository;

use super::transform::order_from_api;
use crate::connector::{Connector, SyncOutcome};
use crate::tiktok::client::ShopClient;
use crate::window::{plan_window, SyncMode};

const SYNC_TYPE: &str = "orders";

#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOptions {
    pub force_full: bool,
    pub max_records: Option<usize>,
}

/// Drives paginated order retrieval into the orders table.
///
/// One pass: acquire the watermark lock, plan the fetch window, walk pages
/// until the token runs out, then commit the new watermark. Records are
/// upserted one page at a time, so a mid-pass failure keeps everything
/// already written while leaving the watermark where it was; the next pass
/// re-fetches from the old position and the upserts absorb the overlap.
pub struct OrderSyncer<R, S> {
    client: ShopClient,
    orders: R,
    sync_repo: S,
    options: SyncOptions,
}

impl<R, S> OrderSyncer<R, S>
where
    R: OrderRepository,
    S: SyncWatermarkRepository,
{
    pub fn new(client: ShopClient, orders: R, sync_repo: S, options: SyncOptions) -> Self {
        Self {
            client,
            orders,
            sync_repo,
            options,
        }
    }

    /// Record the failure on the watermark. The caller returns the original
    /// error, so a failing mark_failed is only logged.
    async fn abort(&self, error: &str) {
        tracing::error!(error, "order sync aborted");
        if let Err(mark_err) = self.sync_repo.mark_failed(SYNC_TYPE, error).await {
            tracing::error!(error = %mark_err, "failed to record sync failure");
        }
    }
}

#[async_trait]
impl<R, S> Connector for OrderSyncer<R, S>
where
    R: OrderRepository,
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

        let watermark = match watermark {
            Some(wm) => wm,
            None => {
                tracing::info!("order sync already running, skipping");
                return Ok(SyncOutcome {
                    sync_type: SYNC_TYPE.to_string(),
                    upserted: 0,
                    skipped: 0,
                    full_sync: false,
                });
            }
        };

        let now = Utc::now();
        let (mode, window) =
            plan_window(watermark.last_sync_time, self.options.force_full, now);
        tracing::info!(
            ?mode,
            from = %window.from,
            to = %window.to,
            "starting order sync pass"
        );

        let mut upserted: usize = 0;
        let mut skipped: usize = 0;
        let mut last_record_time: Option<DateTime<Utc>> = None;
        let mut page_token: Option<String> = None;

        'pages: loop {
            let page = match self
                .client
                .search_orders(Some((window.from, window.to)), page_token.as_deref())
                .await
            {
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
                let Some(order) = order_from_api(raw) else {
                    tracing::warn!("order record without id, skipping");
                    skipped += 1;
                    continue;
                };

                if let Err(e) = self.orders.upsert(&order).await {
                    self.abort(&e.to_string()).await;
                    return Err(Box::new(e));
                }
                upserted += 1;

                if last_record_time.is_none_or(|t| order.created_time > t) {
                    last_record_time = Some(order.created_time);
                }

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
            last_sync_time: window.to,
            last_record_time,
            records_synced: upserted as i64,
            is_full_sync: mode == SyncMode::Full,
        };
        self.sync_repo
            .commit(SYNC_TYPE, &update)
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

        let outcome = SyncOutcome {
            sync_type: SYNC_TYPE.to_string(),
            upserted,
            skipped,
            full_sync: mode == SyncMode::Full,
        };
        tracing::info!(?outcome, "order sync completed");
        Ok(outcome)
    }
}
