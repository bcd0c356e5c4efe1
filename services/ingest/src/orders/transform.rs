use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use shopsync_db::orders::models::Order;

/// Convert a raw API order into a DB row. Returns `None` when the record has
/// no usable id; callers count and skip those. Everything else degrades to a
/// default rather than failing the record, and the raw payload is kept.
pub fn order_from_api(raw: &Value) -> Option<Order> {
    let id = string_field(raw, &["id", "order_id"])?;
    let now = Utc::now();

    let order_number = string_field(raw, &["order_id", "id"]).unwrap_or_else(|| id.clone());
    let status = string_field(raw, &["order_status", "status"])
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let created_time = unix_field(raw, "create_time").unwrap_or(now);
    let payment = &raw["payment"];

    let items = raw["line_items"]
        .as_array()
        .or_else(|| raw["item_list"].as_array());
    let item_count = items.map(|a| a.len()).unwrap_or(0) as i32;

    Some(Order {
        id,
        order_number,
        status,
        created_time,
        paid_time: unix_field(raw, "paid_time"),
        shipped_time: unix_field(raw, "ship_time"),
        delivered_time: unix_field(raw, "delivery_time"),
        total_amount: decimal_value(&payment["total_amount"]),
        currency: payment["currency"]
            .as_str()
            .unwrap_or("GBP")
            .to_string(),
        item_count,
        customer_id: string_field(raw, &["buyer_uid", "buyer_user_id"]),
        shipping_provider: string_field(raw, &["shipping_provider_name", "shipping_provider"]),
        tracking_number: string_field(raw, &["tracking_number"]),
        raw_data: raw.clone(),
        synced_at: now,
    })
}

/// First present key, as a string. Numeric ids are stringified since the API
/// is inconsistent about quoting them.
pub(crate) fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match &raw[*key] {
            Value::String(s) if !s.is_empty() => return Some(s.clone()),
            Value::Number(n) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn unix_field(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    raw[key]
        .as_i64()
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Amounts arrive as strings or numbers; anything unparseable counts as zero.
pub(crate) fn decimal_value(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap_or(Decimal::ZERO),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
