use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::sync::models::{SyncWatermark, WatermarkUpdate};
use crate::sync::repositories::SyncWatermarkRepository;
use shopsync_common::error::{ShopError, ShopResult};

const COLUMNS: &str = "sync_type, last_sync_time, last_record_time, records_synced, \
                       is_full_sync, status, error_message, created_at, updated_at";

#[derive(Clone)]
pub struct PgSyncRepository {
    pool: PgPool,
}

impl PgSyncRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> ShopResult<SyncWatermark> {
        Ok(SyncWatermark {
            sync_type: row.get("sync_type"),
            last_sync_time: row.get("last_sync_time"),
            last_record_time: row.get("last_record_time"),
            records_synced: row.get("records_synced"),
            is_full_sync: row.get("is_full_sync"),
            status: row.get("status"),
            error_message: row.get("error_message"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl SyncWatermarkRepository for PgSyncRepository {
    async fn get(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>> {
        let row = sqlx::query(&format!(
            "select {COLUMNS} from sync_watermarks where sync_type = $1"
        ))
        .bind(sync_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn acquire(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>> {
        sqlx::query("insert into sync_watermarks (sync_type) values ($1) on conflict do nothing")
            .bind(sync_type)
            .execute(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;

        // The conditional update is the lock: only one caller can flip a
        // non-running row to 'running'.
        let row = sqlx::query(&format!(
            "update sync_watermarks
             set status = 'running', error_message = null, updated_at = $1
             where sync_type = $2 and status != 'running'
             returning {COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(sync_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn commit(&self, sync_type: &str, update: &WatermarkUpdate) -> ShopResult<SyncWatermark> {
        let row = sqlx::query(&format!(
            "update sync_watermarks
             set status = 'idle',
                 last_sync_time = $1,
                 last_record_time = $2,
                 records_synced = $3,
                 is_full_sync = $4,
                 error_message = null,
                 updated_at = $1
             where sync_type = $5
             returning {COLUMNS}"
        ))
        .bind(update.last_sync_time)
        .bind(update.last_record_time)
        .bind(update.records_synced)
        .bind(update.is_full_sync)
        .bind(sync_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        Self::map_row(row)
    }

    async fn mark_failed(&self, sync_type: &str, error_message: &str) -> ShopResult<()> {
        sqlx::query(
            "update sync_watermarks
             set status = 'failed', error_message = $1, updated_at = $2
             where sync_type = $3",
        )
        .bind(error_message)
        .bind(Utc::now())
        .bind(sync_type)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(())
    }
}
