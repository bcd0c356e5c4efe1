use serde::Serialize;
use shopsync_db::sync::models::SyncWatermark;

#[derive(Debug, Serialize)]
pub struct SyncCounts {
    pub orders: i64,
    pub products: i64,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub watermarks: Vec<SyncWatermark>,
    pub counts: SyncCounts,
}
