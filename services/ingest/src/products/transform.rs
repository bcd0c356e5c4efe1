use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use shopsync_db::products::models::Product;

use crate::orders::transform::{decimal_value, string_field};

/// Convert a raw API product into a DB row. `None` when the record carries no
/// id. Price comes from the first SKU; stock is summed across every SKU's
/// warehouses.
pub fn product_from_api(raw: &Value) -> Option<Product> {
    let id = string_field(raw, &["id", "product_id"])?;

    let name = string_field(raw, &["title", "product_name"])
        .unwrap_or_else(|| "Unknown Product".to_string());

    // Listing status can be overridden by the audit verdict
    let mut status = string_field(raw, &["status"]).unwrap_or_else(|| "UNKNOWN".to_string());
    if let Some(audit_status) = raw["audit"]["status"].as_str() {
        status = audit_status.to_string();
    }

    let skus = raw["skus"].as_array();
    let (price, sku) = match skus.and_then(|s| s.first()) {
        Some(first) => {
            let price_info = &first["price"];
            let price_value = [
                &price_info["tax_exclusive_price"],
                &price_info["amount"],
                &price_info["original_price"],
            ]
            .into_iter()
            .find(|v| !v.is_null())
            .map(|v| decimal_value(v))
            .unwrap_or(Decimal::ZERO);
            (price_value, string_field(first, &["seller_sku"]))
        }
        None => (Decimal::ZERO, None),
    };

    let mut stock: i64 = 0;
    for sku_entry in skus.into_iter().flatten() {
        let inventories = sku_entry["inventory"]
            .as_array()
            .or_else(|| sku_entry["stock_infos"].as_array());
        for inv in inventories.into_iter().flatten() {
            stock += inv["quantity"]
                .as_i64()
                .or_else(|| inv["available_stock"].as_i64())
                .unwrap_or(0);
        }
    }

    let category = string_field(raw, &["category_name"])
        .or_else(|| raw["category"]["name"].as_str().map(str::to_string));

    // Brand arrives as an object or a bare string
    let brand = match &raw["brand"] {
        Value::Object(b) => b.get("name").and_then(|n| n.as_str()).map(str::to_string),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let images = raw["main_images"]
        .as_array()
        .or_else(|| raw["images"].as_array());
    let image_url = images.and_then(|list| list.first()).and_then(|first| {
        first
            .as_str()
            .map(str::to_string)
            .or_else(|| first["url"].as_str().map(str::to_string))
    });

    Some(Product {
        id,
        name,
        sku,
        status,
        price,
        stock_quantity: stock as i32,
        category,
        brand,
        image_url,
        raw_data: raw.clone(),
        synced_at: Utc::now(),
    })
}
