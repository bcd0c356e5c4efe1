use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::analytics::models::AnalyticsSnapshot;
use shopsync_common::error::{ShopError, ShopResult};

const COLUMNS: &str = "id, start_date, end_date, payload, captured_at";

#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            id: row.get("id"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            payload: row.get("payload"),
            captured_at: row.get("captured_at"),
        }
    }

    /// Store the overview payload for a date range, replacing any previous
    /// capture of the same range.
    pub async fn upsert(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        payload: &serde_json::Value,
    ) -> ShopResult<AnalyticsSnapshot> {
        let query = format!(
            "insert into analytics_snapshots ({COLUMNS})
             values ($1, $2, $3, $4, now())
             on conflict (start_date, end_date) do update set
               payload = excluded.payload,
               captured_at = now()
             returning {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(start_date)
            .bind(end_date)
            .bind(payload)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(Self::map_row(&row))
    }

    /// Most recently captured snapshot, if any.
    pub async fn latest(&self) -> ShopResult<Option<AnalyticsSnapshot>> {
        let query =
            format!("select {COLUMNS} from analytics_snapshots order by captured_at desc limit 1");
        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(row.as_ref().map(Self::map_row))
    }
}
