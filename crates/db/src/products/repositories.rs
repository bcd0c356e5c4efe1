use async_trait::async_trait;

use crate::products::models::{Product, ProductFilter};
use shopsync_common::error::ShopResult;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert or overwrite a product by platform id (last-write-wins).
    async fn upsert(&self, product: &Product) -> ShopResult<()>;

    async fn get(&self, id: &str) -> ShopResult<Option<Product>>;

    async fn list(&self, filter: &ProductFilter) -> ShopResult<Vec<Product>>;

    async fn count(&self) -> ShopResult<i64>;
}
