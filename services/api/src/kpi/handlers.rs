use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use shopsync_common::error::ShopError;

use crate::error::ApiError;
use crate::kpi::responses::{KpiSummaryResponse, KpiTrendsResponse};
use crate::AppState;

const DEFAULT_RANGE_DAYS: i64 = 30;
const MAX_TREND_DAYS: i64 = 365;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    pub days: Option<i64>,
}

/// Resolve an optional date pair to an inclusive UTC datetime range, falling
/// back to the trailing thirty days.
fn resolve_range(
    params: &SummaryParams,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ShopError> {
    let end_date = params.end_date.unwrap_or_else(|| now.date_naive());
    let start_date = params
        .start_date
        .unwrap_or(end_date - Duration::days(DEFAULT_RANGE_DAYS));

    if start_date > end_date {
        return Err(ShopError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let end = end_date
        .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
        .and_utc();
    Ok((start, end))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<KpiSummaryResponse>, ApiError> {
    let (start, end) = resolve_range(&params, Utc::now())?;
    let data = state.kpi_repo.summary(start, end).await?;
    Ok(Json(KpiSummaryResponse {
        data,
        start_date: start.date_naive(),
        end_date: end.date_naive(),
    }))
}

pub async fn get_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<KpiTrendsResponse>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_RANGE_DAYS);
    if days < 1 || days > MAX_TREND_DAYS {
        return Err(ShopError::Validation(format!(
            "days must be between 1 and {MAX_TREND_DAYS}"
        ))
        .into());
    }

    let end = Utc::now();
    let start = end - Duration::days(days);
    let data = state.kpi_repo.daily_trends(start, end).await?;
    let count = data.len();
    Ok(Json(KpiTrendsResponse { data, count }))
}
