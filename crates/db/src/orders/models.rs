use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A platform order, normalized from the raw API payload.
/// `id` is the platform order id; upserts are keyed on it (last-write-wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub status: String,
    pub created_time: DateTime<Utc>,
    pub paid_time: Option<DateTime<Utc>>,
    pub shipped_time: Option<DateTime<Utc>>,
    pub delivered_time: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub currency: String,
    pub item_count: i32,
    pub customer_id: Option<String>,
    pub shipping_provider: Option<String>,
    pub tracking_number: Option<String>,
    pub raw_data: serde_json::Value,
    pub synced_at: DateTime<Utc>,
}

/// Query filter for the orders listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
