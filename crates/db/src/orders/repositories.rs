use async_trait::async_trait;

use crate::orders::models::{Order, OrderFilter};
use shopsync_common::error::ShopResult;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert or overwrite an order by platform id (last-write-wins).
    async fn upsert(&self, order: &Order) -> ShopResult<()>;

    async fn get(&self, id: &str) -> ShopResult<Option<Order>>;

    /// List orders by status/date range, newest first.
    async fn list(&self, filter: &OrderFilter) -> ShopResult<Vec<Order>>;

    async fn count(&self) -> ShopResult<i64>;
}
