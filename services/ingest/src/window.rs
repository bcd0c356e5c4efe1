use chrono::{DateTime, Duration, Utc};

/// Overlap subtracted from the last watermark so records landing near the
/// boundary are never missed. Re-fetched records are upserted, so the overlap
/// is safe.
pub const OVERLAP_MINUTES: i64 = 5;

/// A full pass never reaches further back than this. The upstream API caps
/// order search history around this horizon anyway.
pub const HISTORY_LIMIT_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Decide the fetch window for a pass. No watermark or an explicit force
/// means a full pass over the bounded history; otherwise resume from the
/// watermark minus the overlap.
pub fn plan_window(
    last_sync: Option<DateTime<Utc>>,
    force_full: bool,
    now: DateTime<Utc>,
) -> (SyncMode, FetchWindow) {
    match last_sync {
        Some(last) if !force_full => (
            SyncMode::Incremental,
            FetchWindow {
                from: last - Duration::minutes(OVERLAP_MINUTES),
                to: now,
            },
        ),
        _ => (
            SyncMode::Full,
            FetchWindow {
                from: now - Duration::days(HISTORY_LIMIT_DAYS),
                to: now,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn no_watermark_means_full_pass() {
        let now = ts(1_700_000_000);
        let (mode, window) = plan_window(None, false, now);
        assert_eq!(mode, SyncMode::Full);
        assert_eq!(window.from, now - Duration::days(HISTORY_LIMIT_DAYS));
        assert_eq!(window.to, now);
    }

    #[test]
    fn incremental_starts_five_minutes_before_watermark() {
        let now = ts(1_700_000_000);
        let last = ts(1_699_990_000);
        let (mode, window) = plan_window(Some(last), false, now);
        assert_eq!(mode, SyncMode::Incremental);
        assert_eq!(window.from, last - Duration::minutes(5));
        assert_eq!(window.to, now);
    }

    #[test]
    fn force_full_ignores_watermark() {
        let now = ts(1_700_000_000);
        let (mode, window) = plan_window(Some(ts(1_699_990_000)), true, now);
        assert_eq!(mode, SyncMode::Full);
        assert_eq!(window.from, now - Duration::days(HISTORY_LIMIT_DAYS));
    }
}
