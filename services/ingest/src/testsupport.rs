//! In-memory repository doubles for exercising syncers without Postgres.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use shopsync_common::error::ShopResult;
use shopsync_db::orders::models::{Order, OrderFilter};
use shopsync_db::orders::repositories::OrderRepository;
use shopsync_db::products::models::{Product, ProductFilter};
use shopsync_db::products::repositories::ProductRepository;
use shopsync_db::sync::models::{SyncWatermark, WatermarkUpdate};
use shopsync_db::sync::repositories::SyncWatermarkRepository;

#[derive(Default, Clone)]
pub struct MemOrderRepo {
    rows: Arc<Mutex<HashMap<String, Order>>>,
}

impl MemOrderRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderRepository for MemOrderRepo {
    async fn upsert(&self, order: &Order) -> ShopResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> ShopResult<Option<Order>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, _filter: &OrderFilter) -> ShopResult<Vec<Order>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> ShopResult<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Default, Clone)]
pub struct MemProductRepo {
    rows: Arc<Mutex<HashMap<String, Product>>>,
}

impl MemProductRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductRepository for MemProductRepo {
    async fn upsert(&self, product: &Product) -> ShopResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> ShopResult<Option<Product>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, _filter: &ProductFilter) -> ShopResult<Vec<Product>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> ShopResult<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Default, Clone)]
pub struct MemSyncRepo {
    rows: Arc<Mutex<HashMap<String, SyncWatermark>>>,
}

fn fresh_watermark(sync_type: &str) -> SyncWatermark {
    let now = Utc::now();
    SyncWatermark {
        sync_type: sync_type.to_string(),
        last_sync_time: None,
        last_record_time: None,
        records_synced: 0,
        is_full_sync: false,
        status: "idle".to_string(),
        error_message: None,
        created_at: now,
        updated_at: now,
    }
}

impl MemSyncRepo {
    pub fn get_watermark(&self, sync_type: &str) -> Option<SyncWatermark> {
        self.rows.lock().unwrap().get(sync_type).cloned()
    }

    pub fn set_running(&self, sync_type: &str) {
        let mut rows = self.rows.lock().unwrap();
        let wm = rows
            .entry(sync_type.to_string())
            .or_insert_with(|| fresh_watermark(sync_type));
        wm.status = "running".to_string();
    }
}

#[async_trait]
impl SyncWatermarkRepository for MemSyncRepo {
    async fn get(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>> {
        Ok(self.rows.lock().unwrap().get(sync_type).cloned())
    }

    async fn acquire(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>> {
        let mut rows = self.rows.lock().unwrap();
        let wm = rows
            .entry(sync_type.to_string())
            .or_insert_with(|| fresh_watermark(sync_type));
        if wm.status == "running" {
            return Ok(None);
        }
        wm.status = "running".to_string();
        wm.updated_at = Utc::now();
        Ok(Some(wm.clone()))
    }

    async fn commit(
        &self,
        sync_type: &str,
        update: &WatermarkUpdate,
    ) -> ShopResult<SyncWatermark> {
        let mut rows = self.rows.lock().unwrap();
        let wm = rows
            .entry(sync_type.to_string())
            .or_insert_with(|| fresh_watermark(sync_type));
        wm.last_sync_time = Some(update.last_sync_time);
        wm.last_record_time = update.last_record_time;
        wm.records_synced = update.records_synced;
        wm.is_full_sync = update.is_full_sync;
        wm.status = "idle".to_string();
        wm.error_message = None;
        wm.updated_at = Utc::now();
        Ok(wm.clone())
    }

    async fn mark_failed(&self, sync_type: &str, error_message: &str) -> ShopResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let wm = rows
            .entry(sync_type.to_string())
            .or_insert_with(|| fresh_watermark(sync_type));
        wm.status = "failed".to_string();
        wm.error_message = Some(error_message.to_string());
        wm.updated_at = Utc::now();
        Ok(())
    }
}
