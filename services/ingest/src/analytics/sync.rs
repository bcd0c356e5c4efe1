use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use shopsync_common::error::ShopResult;
use shopsync_db::analytics::models::AnalyticsSnapshot;
use shopsync_db::analytics::pg_repository::PgAnalyticsRepository;
use shopsync_db::sync::models::WatermarkUpdate;
use shopsync_db::sync::repositories::SyncWatermarkRepository;

use crate::connector::{Connector, SyncOutcome};
use crate::tiktok::client::ShopClient;

const SYNC_TYPE: &str = "analytics";
const OVERVIEW_DAYS: i64 = 7;

/// Where captured overview payloads go. Split out so the syncer can run
/// against an in-memory store in tests.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn upsert(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        payload: &serde_json::Value,
    ) -> ShopResult<AnalyticsSnapshot>;
}

#[async_trait]
impl SnapshotStore for PgAnalyticsRepository {
    async fn upsert(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        payload: &serde_json::Value,
    ) -> ShopResult<AnalyticsSnapshot> {
        PgAnalyticsRepository::upsert(self, start_date, end_date, payload).await
    }
}

/// Trailing window captured on each pass: the last seven full days up to
/// today.
pub fn overview_window(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let end = now.date_naive();
    (end - Duration::days(OVERVIEW_DAYS), end)
}

/// Captures the shop performance overview into a snapshot row. One fetch per
/// pass; the watermark records the capture like any other domain.
pub struct AnalyticsSyncer<A, S> {
    client: ShopClient,
    snapshots: A,
    sync_repo: S,
}

impl<A, S> AnalyticsSyncer<A, S>
where
    A: SnapshotStore,
    S: SyncWatermarkRepository,
{
    pub fn new(client: ShopClient, snapshots: A, sync_repo: S) -> Self {
        Self {
            client,
            snapshots,
            sync_repo,
        }
    }

    /// Record the failure on the watermark. The caller returns the original
    /// error, so a failing mark_failed is only logged.
    async fn abort(&self, error: &str) {
        tracing::error!(error, "analytics sync aborted");
        if let Err(mark_err) = self.sync_repo.mark_failed(SYNC_TYPE, error).await {
            tracing::error!(error = %mark_err, "failed to record sync failure");
        }
    }
}

#[async_trait]
impl<A, S> Connector for AnalyticsSyncer<A, S>
where
    A: SnapshotStore,
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
            tracing::info!("analytics sync already running, skipping");
            return Ok(SyncOutcome {
                sync_type: SYNC_TYPE.to_string(),
                upserted: 0,
                skipped: 0,
                full_sync: false,
            });
        }

        let now = Utc::now();
        let (start_date, end_date) = overview_window(now);
        tracing::info!(%start_date, %end_date, "capturing performance overview");

        let payload = match self
            .client
            .shop_performance_overview(&start_date.to_string(), &end_date.to_string())
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                self.abort(&e.to_string()).await;
                return Err(Box::new(e));
            }
        };

        if let Err(e) = self.snapshots.upsert(start_date, end_date, &payload).await {
            self.abort(&e.to_string()).await;
            return Err(Box::new(e));
        }

        let update = WatermarkUpdate {
            last_sync_time: now,
            last_record_time: None,
            records_synced: 1,
            is_full_sync: false,
        };
        self.sync_repo
            .commit(SYNC_TYPE, &update)
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

        let outcome = SyncOutcome {
            sync_type: SYNC_TYPE.to_string(),
            upserted: 1,
            skipped: 0,
            full_sync: false,
        };
        tracing::info!(?outcome, "analytics sync completed");
        Ok(outcome)
    }
}
