use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::products::models::{Product, ProductFilter};
use crate::products::repositories::ProductRepository;
use shopsync_common::error::{ShopError, ShopResult};

const COLUMNS: &str = "id, name, sku, status, price, stock_quantity, category, brand, \
                       image_url, raw_data, synced_at";

const DEFAULT_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> ShopResult<Product> {
        Ok(Product {
            id: row.get("id"),
            name: row.get("name"),
            sku: row.get("sku"),
            status: row.get("status"),
            price: row.get("price"),
            stock_quantity: row.get("stock_quantity"),
            category: row.get("category"),
            brand: row.get("brand"),
            image_url: row.get("image_url"),
            raw_data: row.get("raw_data"),
            synced_at: row.get("synced_at"),
        })
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn upsert(&self, product: &Product) -> ShopResult<()> {
        sqlx::query(
            "insert into products
             (id, name, sku, status, price, stock_quantity, category, brand,
              image_url, raw_data, synced_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             on conflict (id) do update set
               name = excluded.name,
               sku = excluded.sku,
               status = excluded.status,
               price = excluded.price,
               stock_quantity = excluded.stock_quantity,
               category = excluded.category,
               brand = excluded.brand,
               image_url = excluded.image_url,
               raw_data = excluded.raw_data,
               synced_at = excluded.synced_at",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.status)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.image_url)
        .bind(&product.raw_data)
        .bind(product.synced_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> ShopResult<Option<Product>> {
        let row = sqlx::query(&format!("select {COLUMNS} from products where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &ProductFilter) -> ShopResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "select {COLUMNS} from products
             where ($1::text is null or status = $1)
             order by synced_at desc
             limit $2 offset $3"
        ))
        .bind(&filter.status)
        .bind(filter.limit.unwrap_or(DEFAULT_LIMIT))
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        rows.into_iter().map(Self::map_row).collect()
    }

    async fn count(&self) -> ShopResult<i64> {
        let row = sqlx::query("select count(*) as cnt from products")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(row.get::<i64, _>("cnt"))
    }
}
