use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::kpi::models::{estimated_net_revenue, DailyKpi, KpiSummary};
use shopsync_common::error::{ShopError, ShopResult};

#[derive(Clone)]
pub struct PgKpiRepository {
    pool: PgPool,
}

impl PgKpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Aggregate summary KPIs over orders created in `[start, end]`.
    pub async fn summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ShopResult<KpiSummary> {
        let row = sqlx::query(
            "select
               count(*) as total_orders,
               coalesce(sum(total_amount), 0) as total_gmv,
               coalesce(sum(item_count), 0)::bigint as total_items_sold,
               count(*) filter (where status in ('COMPLETED', 'DELIVERED')) as completed_orders,
               count(*) filter (where status in ('PENDING', 'AWAITING_SHIPMENT')) as pending_orders,
               count(*) filter (where status = 'CANCELLED') as cancelled_orders,
               count(distinct customer_id) as unique_customers
             from orders
             where created_time >= $1 and created_time <= $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        let total_orders: i64 = row.get("total_orders");
        let total_gmv: Decimal = row.get("total_gmv");

        let average_order_value = if total_orders > 0 {
            (total_gmv / Decimal::from(total_orders)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Ok(KpiSummary {
            total_orders,
            total_gmv,
            estimated_net_revenue: estimated_net_revenue(total_gmv),
            total_items_sold: row.get("total_items_sold"),
            average_order_value,
            completed_orders: row.get("completed_orders"),
            pending_orders: row.get("pending_orders"),
            cancelled_orders: row.get("cancelled_orders"),
            unique_customers: row.get("unique_customers"),
        })
    }

    /// Daily breakdown of orders/GMV/items/customers over `[start, end]`.
    pub async fn daily_trends(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ShopResult<Vec<DailyKpi>> {
        let rows = sqlx::query(
            "select
               created_time::date as day,
               count(*) as orders,
               coalesce(sum(total_amount), 0) as gmv,
               coalesce(sum(item_count), 0)::bigint as items,
               count(distinct customer_id) as customers
             from orders
             where created_time >= $1 and created_time <= $2
             group by 1
             order by 1",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let gmv: Decimal = row.get("gmv");
                DailyKpi {
                    date: row.get("day"),
                    orders: row.get("orders"),
                    gmv,
                    estimated_net_revenue: estimated_net_revenue(gmv),
                    items: row.get("items"),
                    customers: row.get("customers"),
                }
            })
            .collect())
    }
}
