use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted marker of sync progress, one row per sync domain
/// (`orders`, `products`, `analytics`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncWatermark {
    pub sync_type: String,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_record_time: Option<DateTime<Utc>>,
    pub records_synced: i64,
    pub is_full_sync: bool,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// End-of-pass watermark update. Committed as a single statement so the
/// watermark either fully advances or stays untouched.
#[derive(Debug, Clone)]
pub struct WatermarkUpdate {
    pub last_sync_time: DateTime<Utc>,
    pub last_record_time: Option<DateTime<Utc>>,
    pub records_synced: i64,
    pub is_full_sync: bool,
}
