/// Clock helpers in the authority's time zone.
///
/// Both SSM endpoints reason in Swedish local time. Window bounds, the UV
/// day offset and the "current hour" are therefore all computed in
/// Europe/Stockholm, independent of the host's own zone.
///
/// # Clock injection
/// Every function takes `now: DateTime<Utc>` instead of reading the clock,
/// so DST transitions can be tested at exact instants.

use chrono::{DateTime, Datelike, Duration, DurationRound, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::model::SsmError;

/// Time zone the SSM APIs expect.
pub const AUTHORITY_TZ: Tz = chrono_tz::Europe::Stockholm;

/// Radiation history lookback outside daylight saving time, in hours.
pub const STANDARD_LOOKBACK_HOURS: i64 = 2;

/// Radiation history lookback under daylight saving time, in hours.
pub const DST_LOOKBACK_HOURS: i64 = 3;

/// A closed time range sent to `getHistoryForStation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Returns `true` if Stockholm observes daylight saving time at `now`.
pub fn is_dst(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&AUTHORITY_TZ);
    !local.offset().dst_offset().is_zero()
}

/// The radiation history window ending at the current whole hour.
///
/// `end` is `now` truncated to the hour; `start` lies 2 hours earlier in
/// standard time and 3 hours earlier under DST. Stockholm's offset is a
/// whole number of hours, so truncating in UTC equals truncating locally.
pub fn radiation_window(now: DateTime<Utc>) -> Result<TimeWindow, SsmError> {
    let end = now
        .duration_trunc(Duration::hours(1))
        .map_err(|e| SsmError::Config(format!("cannot truncate {} to the hour: {}", now, e)))?;
    let lookback = if is_dst(now) {
        DST_LOOKBACK_HOURS
    } else {
        STANDARD_LOOKBACK_HOURS
    };
    Ok(TimeWindow {
        start: end - Duration::hours(lookback),
        end,
    })
}

/// The `offset` query parameter for the UV endpoint: "-2" under DST,
/// "-1" otherwise. Deliberately not derived from the radiation lookback.
pub fn uv_day_offset(now: DateTime<Utc>) -> &'static str {
    if is_dst(now) { "-2" } else { "-1" }
}

/// Current hour of day (0-23) in Stockholm.
pub fn local_hour(now: DateTime<Utc>) -> u32 {
    now.with_timezone(&AUTHORITY_TZ).hour()
}

/// Current date in Stockholm as `YYYY-MM-DD`.
pub fn local_date_string(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&AUTHORITY_TZ);
    format!("{:04}-{:02}-{:02}", local.year(), local.month(), local.day())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // --- DST status ---------------------------------------------------------

    #[test]
    fn test_winter_and_summer_dst_status() {
        assert!(!is_dst(utc(2024, 1, 15, 12, 0)));
        assert!(is_dst(utc(2024, 7, 15, 12, 0)));
    }

    #[test]
    fn test_spring_transition_2024() {
        // Clocks go forward at 01:00 UTC on 2024-03-31.
        assert!(!is_dst(utc(2024, 3, 31, 0, 59)));
        assert!(is_dst(utc(2024, 3, 31, 1, 0)));
    }

    #[test]
    fn test_autumn_transition_2024() {
        // Clocks go back at 01:00 UTC on 2024-10-27.
        assert!(is_dst(utc(2024, 10, 27, 0, 59)));
        assert!(!is_dst(utc(2024, 10, 27, 1, 0)));
    }

    // --- UV offset ----------------------------------------------------------

    #[test]
    fn test_uv_offset_follows_dst() {
        assert_eq!(uv_day_offset(utc(2024, 3, 31, 0, 59)), "-1");
        assert_eq!(uv_day_offset(utc(2024, 3, 31, 1, 0)), "-2");
        assert_eq!(uv_day_offset(utc(2024, 10, 27, 0, 59)), "-2");
        assert_eq!(uv_day_offset(utc(2024, 10, 27, 1, 0)), "-1");
    }

    // --- Radiation window ---------------------------------------------------

    #[test]
    fn test_window_is_two_hours_in_winter() {
        let window = radiation_window(utc(2024, 1, 15, 12, 34)).unwrap();
        assert_eq!(window.end, utc(2024, 1, 15, 12, 0));
        assert_eq!(window.start, utc(2024, 1, 15, 10, 0));
    }

    #[test]
    fn test_window_is_three_hours_in_summer() {
        let window = radiation_window(utc(2024, 7, 15, 12, 34)).unwrap();
        assert_eq!(window.end, utc(2024, 7, 15, 12, 0));
        assert_eq!(window.start, utc(2024, 7, 15, 9, 0));
    }

    #[test]
    fn test_window_bounds_are_milliseconds() {
        let window = radiation_window(utc(2024, 1, 15, 12, 0)).unwrap();
        assert_eq!(window.end_ms(), 1_705_320_000_000);
        assert_eq!(window.end_ms() - window.start_ms(), 2 * 3_600_000);
    }

    // --- Local hour and date ------------------------------------------------

    #[test]
    fn test_local_hour_is_stockholm_time() {
        // 22:30 UTC in July is 00:30 the next day in Stockholm.
        let now = utc(2024, 7, 15, 22, 30);
        assert_eq!(local_hour(now), 0);
        assert_eq!(local_date_string(now), "2024-07-16");
    }

    #[test]
    fn test_local_hour_in_winter() {
        let now = utc(2024, 1, 15, 11, 5);
        assert_eq!(local_hour(now), 12);
        assert_eq!(local_date_string(now), "2024-01-15");
    }
}
