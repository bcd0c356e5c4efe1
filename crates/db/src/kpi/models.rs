use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Dashboard summary metrics for a date range, aggregated from synced orders.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub total_orders: i64,
    pub total_gmv: Decimal,
    pub estimated_net_revenue: Decimal,
    pub total_items_sold: i64,
    pub average_order_value: Decimal,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub cancelled_orders: i64,
    pub unique_customers: i64,
}

/// One day of the trends breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct DailyKpi {
    pub date: NaiveDate,
    pub orders: i64,
    pub gmv: Decimal,
    pub estimated_net_revenue: Decimal,
    pub items: i64,
    pub customers: i64,
}

/// Net revenue estimate: GMV minus a flat 15% platform fee. Actual fees vary
/// per order; this matches the dashboard's approximation.
pub fn estimated_net_revenue(gmv: Decimal) -> Decimal {
    (gmv * Decimal::new(85, 2)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_revenue_is_85_percent() {
        assert_eq!(
            estimated_net_revenue(Decimal::new(10000, 2)),
            Decimal::new(8500, 2)
        );
    }

    #[test]
    fn net_revenue_rounds_to_pennies() {
        // 33.33 * 0.85 = 28.3305 → 28.33
        assert_eq!(
            estimated_net_revenue(Decimal::new(3333, 2)),
            Decimal::new(2833, 2)
        );
    }

    #[test]
    fn net_revenue_of_zero_is_zero() {
        assert_eq!(estimated_net_revenue(Decimal::ZERO), Decimal::ZERO);
    }
}
