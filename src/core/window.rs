//! Resolution of user-supplied dates into a concrete fetch window.
//!
//! All calendar arithmetic happens in the user's timezone. Local midnight in
//! `Asia/Tokyo` is 15:00 UTC of the previous day, so converting a UTC date
//! range would miss or double-count messages near the day boundary.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::models::TimeWindow;
use crate::errors::DraftError;

/// Length of the default look-back window when no start date is given.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex compile"));

/// Timezone lookup result. An unknown name resolves to UTC with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimezone {
    pub tz: Tz,
    pub fallback: Option<DraftError>,
}

#[must_use]
pub fn resolve_timezone(name: &str) -> ResolvedTimezone {
    match name.trim().parse::<Tz>() {
        Ok(tz) => ResolvedTimezone { tz, fallback: None },
        Err(e) => {
            warn!(timezone = %name, error = %e, "Unknown timezone, defaulting to UTC");
            ResolvedTimezone {
                tz: chrono_tz::UTC,
                fallback: Some(DraftError::InvalidTimezone(name.to_string())),
            }
        }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`DraftError::InvalidDateFormat`] for anything else, including
/// well-shaped but impossible dates such as `2024-13-40`.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, DraftError> {
    let trimmed = raw.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(DraftError::InvalidDateFormat(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| DraftError::InvalidDateFormat(raw.to_string()))
}

/// First instant of `date` in `tz`.
#[must_use]
pub fn start_of_day(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    first_valid_local(tz, midnight)
}

/// Last representable instant (23:59:59.999999) of `date` in `tz`.
#[must_use]
pub fn end_of_day(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    match tz.from_local_datetime(&date.and_time(last)) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, later) => later,
        // No DST gap swallows the last second of a day; treat as next midnight.
        LocalResult::None => start_of_day(tz, date + Duration::days(1)),
    }
}

// A DST gap can remove local midnight; step forward until the wall clock exists.
fn first_valid_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..=24 * 4 {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += Duration::minutes(15);
    }
    tz.from_utc_datetime(&naive)
}

/// Resolve an explicit or defaulted date range.
///
/// - `from`: start of that day in the user's timezone, else `now - 24h`.
/// - `to`: end of that day in the user's timezone, else `now`.
///
/// # Errors
///
/// [`DraftError::InvalidDateFormat`] when either date fails to parse and
/// [`DraftError::InvalidDateRange`] when the resulting start lies after the end.
pub fn resolve(
    from: Option<&str>,
    to: Option<&str>,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<TimeWindow, DraftError> {
    let ResolvedTimezone { tz, fallback } = resolve_timezone(timezone);
    let now_local = now.with_timezone(&tz);

    let start = match from.filter(|s| !s.trim().is_empty()) {
        Some(raw) => start_of_day(tz, parse_calendar_date(raw)?),
        None => now_local - Duration::hours(DEFAULT_LOOKBACK_HOURS),
    };

    let end = match to.filter(|s| !s.trim().is_empty()) {
        Some(raw) => end_of_day(tz, parse_calendar_date(raw)?),
        None => now_local,
    };

    if start > end {
        return Err(DraftError::InvalidDateRange(format!(
            "{} is after {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )));
    }

    Ok(TimeWindow {
        start,
        end,
        timezone: tz,
        timezone_fallback: fallback,
    })
}

/// Local midnight of today (in the user's timezone) up to `now`.
#[must_use]
pub fn resolve_today(timezone: &str, now: DateTime<Utc>) -> TimeWindow {
    let ResolvedTimezone { tz, fallback } = resolve_timezone(timezone);
    let now_local = now.with_timezone(&tz);
    let start = start_of_day(tz, now_local.date_naive());

    TimeWindow {
        start,
        end: now_local,
        timezone: tz,
        timezone_fallback: fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn jst(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_defaults_to_last_24_hours() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let window = resolve(None, None, "Asia/Tokyo", now).unwrap();
        assert_eq!(window.start_utc(), now - Duration::hours(24));
        assert_eq!(window.end_utc(), now);
        assert!(window.timezone_fallback.is_none());
    }

    #[test]
    fn test_from_date_is_local_midnight() {
        let now = jst(2024, 3, 2, 10, 0);
        let window = resolve(Some("2024-03-01"), None, "Asia/Tokyo", now).unwrap();
        assert_eq!(window.start_utc(), jst(2024, 3, 1, 0, 0));
        assert_eq!(window.start.to_rfc3339(), "2024-03-01T00:00:00+09:00");
        assert_eq!(window.end_utc(), now);
    }

    #[test]
    fn test_to_date_is_end_of_local_day() {
        let now = jst(2024, 3, 10, 10, 0);
        let window = resolve(Some("2024-03-01"), Some("2024-03-02"), "Asia/Tokyo", now).unwrap();
        assert_eq!(
            window.end.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string(),
            "2024-03-02T23:59:59.999999+09:00"
        );
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        let now = Utc::now();
        for raw in ["2024-13-40", "2024/03/01", "March 1", "2024-3-1", "20240301"] {
            let err = resolve(Some(raw), None, "Asia/Tokyo", now).unwrap_err();
            assert!(
                matches!(err, DraftError::InvalidDateFormat(_)),
                "expected InvalidDateFormat for {raw}"
            );
        }
        let err = resolve(None, Some("2024-02-30"), "UTC", now).unwrap_err();
        assert!(matches!(err, DraftError::InvalidDateFormat(_)));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let now = Utc::now();
        let err = resolve(Some("2024-03-05"), Some("2024-03-01"), "UTC", now).unwrap_err();
        assert!(matches!(err, DraftError::InvalidDateRange(_)));
    }

    #[test]
    fn test_today_uses_local_midnight_not_utc_midnight() {
        let now = jst(2024, 3, 1, 10, 0);
        let window = resolve_today("Asia/Tokyo", now);

        assert_eq!(window.start.to_rfc3339(), "2024-03-01T00:00:00+09:00");
        assert_eq!(window.end_utc(), now);

        let utc_view = Utc.with_ymd_and_hms(2024, 2, 29, 15, 0, 0).unwrap();
        assert_eq!(window.start_utc(), utc_view);
        let naive_utc_midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_ne!(window.start_utc(), naive_utc_midnight);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc_with_warning() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let window = resolve_today("Mars/Olympus_Mons", now);
        assert_eq!(window.timezone, chrono_tz::UTC);
        assert_eq!(
            window.timezone_fallback,
            Some(DraftError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
        assert_eq!(
            window.start_utc(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_survives_midnight_dst_gap() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04.
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let start = start_of_day(tz, date);
        assert_eq!(start.date_naive(), date);
        assert_eq!(start.format("%H:%M").to_string(), "01:00");
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let window = resolve(None, None, "UTC", now).unwrap();
        assert!(window.contains(&window.start_utc()));
        assert!(!window.contains(&now));
    }
}
