use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw shop performance overview payload for a date range, as returned by the
/// platform analytics API. Kept verbatim; the dashboard parses what it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payload: serde_json::Value,
    pub captured_at: DateTime<Utc>,
}
