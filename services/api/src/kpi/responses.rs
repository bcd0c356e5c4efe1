use chrono::NaiveDate;
use serde::Serialize;
use shopsync_db::kpi::models::{DailyKpi, KpiSummary};

#[derive(Debug, Serialize)]
pub struct KpiSummaryResponse {
    pub data: KpiSummary,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct KpiTrendsResponse {
    pub data: Vec<DailyKpi>,
    pub count: usize,
}
