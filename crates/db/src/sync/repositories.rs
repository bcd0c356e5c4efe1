use async_trait::async_trait;

use crate::sync::models::{SyncWatermark, WatermarkUpdate};
use shopsync_common::error::ShopResult;

#[async_trait]
pub trait SyncWatermarkRepository: Send + Sync {
    /// Read the watermark for a sync domain, if one exists.
    async fn get(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>>;

    /// Ensure a watermark row exists and atomically move it to 'running'.
    /// Returns `None` if a pass is already in flight for this domain.
    async fn acquire(&self, sync_type: &str) -> ShopResult<Option<SyncWatermark>>;

    /// Commit the end-of-pass watermark in one statement and release the lock.
    async fn commit(&self, sync_type: &str, update: &WatermarkUpdate) -> ShopResult<SyncWatermark>;

    /// Release the lock recording a failure. Progress fields are untouched, so
    /// the next pass re-fetches from the old watermark.
    async fn mark_failed(&self, sync_type: &str, error_message: &str) -> ShopResult<()>;
}
