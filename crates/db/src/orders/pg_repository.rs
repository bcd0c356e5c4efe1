use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::orders::models::{Order, OrderFilter};
use crate::orders::repositories::OrderRepository;
use shopsync_common::error::{ShopError, ShopResult};

const COLUMNS: &str = "id, order_number, status, created_time, paid_time, shipped_time, \
                       delivered_time, total_amount, currency, item_count, customer_id, \
                       shipping_provider, tracking_number, raw_data, synced_at";

const DEFAULT_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> ShopResult<Order> {
        Ok(Order {
            id: row.get("id"),
            order_number: row.get("order_number"),
            status: row.get("status"),
            created_time: row.get("created_time"),
            paid_time: row.get("paid_time"),
            shipped_time: row.get("shipped_time"),
            delivered_time: row.get("delivered_time"),
            total_amount: row.get("total_amount"),
            currency: row.get("currency"),
            item_count: row.get("item_count"),
            customer_id: row.get("customer_id"),
            shipping_provider: row.get("shipping_provider"),
            tracking_number: row.get("tracking_number"),
            raw_data: row.get("raw_data"),
            synced_at: row.get("synced_at"),
        })
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn upsert(&self, order: &Order) -> ShopResult<()> {
        sqlx::query(
            "insert into orders
             (id, order_number, status, created_time, paid_time, shipped_time,
              delivered_time, total_amount, currency, item_count, customer_id,
              shipping_provider, tracking_number, raw_data, synced_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             on conflict (id) do update set
               order_number = excluded.order_number,
               status = excluded.status,
               created_time = excluded.created_time,
               paid_time = excluded.paid_time,
               shipped_time = excluded.shipped_time,
               delivered_time = excluded.delivered_time,
               total_amount = excluded.total_amount,
               currency = excluded.currency,
               item_count = excluded.item_count,
               customer_id = excluded.customer_id,
               shipping_provider = excluded.shipping_provider,
               tracking_number = excluded.tracking_number,
               raw_data = excluded.raw_data,
               synced_at = excluded.synced_at",
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.status)
        .bind(order.created_time)
        .bind(order.paid_time)
        .bind(order.shipped_time)
        .bind(order.delivered_time)
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(order.item_count)
        .bind(&order.customer_id)
        .bind(&order.shipping_provider)
        .bind(&order.tracking_number)
        .bind(&order.raw_data)
        .bind(order.synced_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> ShopResult<Option<Order>> {
        let row = sqlx::query(&format!("select {COLUMNS} from orders where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &OrderFilter) -> ShopResult<Vec<Order>> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT);
        let rows = sqlx::query(&format!(
            "select {COLUMNS} from orders
             where ($1::text is null or status = $1)
               and ($2::timestamptz is null or created_time >= $2)
               and ($3::timestamptz is null or created_time <= $3)
             order by created_time desc
             limit $4 offset $5"
        ))
        .bind(&filter.status)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit)
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        rows.into_iter().map(Self::map_row).collect()
    }

    async fn count(&self) -> ShopResult<i64> {
        let row = sqlx::query("select count(*) as cnt from orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;
        Ok(row.get::<i64, _>("cnt"))
    }
}

#[cfg(test)]
pub(crate) async fn create_orders_table(pool: &PgPool) -> Option<()> {
    sqlx::query(
        "create table if not exists orders (
           id text primary key,
           order_number text not null,
           status text not null,
           created_time timestamptz not null,
           paid_time timestamptz,
           shipped_time timestamptz,
           delivered_time timestamptz,
           total_amount numeric(10,2) not null default 0,
           currency text not null default 'GBP',
           item_count integer not null default 0,
           customer_id text,
           shipping_provider text,
           tracking_number text,
           raw_data jsonb,
           synced_at timestamptz not null default now()
         )",
    )
    .execute(pool)
    .await
    .ok()?;
    Some(())
}
