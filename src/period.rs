//! Fixed 12-hour check-in windows anchored at 07:00 and 19:00 local time.
//!
//! A user may check in once per window. Windows are half-open `[start, end)`
//! and computed on wall-clock local time: across a DST transition a window is
//! not stretched or shrunk back to exactly 12 real hours.

use chrono::{
    Datelike, DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AttendanceError;

pub const DAY_ANCHOR_HOUR: u32 = 7;
pub const NIGHT_ANCHOR_HOUR: u32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Window {
    pub fn contains<T: TimeZone>(&self, t: &DateTime<T>) -> bool {
        *t >= self.start && *t < self.end
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

/// Window as returned to kiosk clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct WindowView {
    #[schema(value_type = String, format = DateTime, example = "2026-03-02T07:00:00-03:00")]
    pub start: DateTime<chrono::FixedOffset>,
    #[schema(value_type = String, format = DateTime, example = "2026-03-02T19:00:00-03:00")]
    pub end: DateTime<chrono::FixedOffset>,
}

impl From<Window> for WindowView {
    fn from(w: Window) -> Self {
        Self {
            start: w.start.fixed_offset(),
            end: w.end.fixed_offset(),
        }
    }
}

/// Window containing `t`.
pub fn window_for(t: &DateTime<Tz>) -> Window {
    let tz = t.timezone();
    let date = t.date_naive();
    let hour = t.hour();

    let (start_date, start_hour) = if hour < DAY_ANCHOR_HOUR {
        (previous_day(date), NIGHT_ANCHOR_HOUR)
    } else if hour < NIGHT_ANCHOR_HOUR {
        (date, DAY_ANCHOR_HOUR)
    } else {
        (date, NIGHT_ANCHOR_HOUR)
    };

    let (end_date, end_hour) = if start_hour == DAY_ANCHOR_HOUR {
        (start_date, NIGHT_ANCHOR_HOUR)
    } else {
        (next_day(start_date), DAY_ANCHOR_HOUR)
    };

    Window {
        start: at_local(&tz, start_date, start_hour),
        end: at_local(&tz, end_date, end_hour),
    }
}

/// Local midnight starting the calendar day of `t`.
pub fn start_of_day(t: &DateTime<Tz>) -> DateTime<Tz> {
    at_local(&t.timezone(), t.date_naive(), 0)
}

/// Local midnight starting the calendar month of `t`.
pub fn start_of_month(t: &DateTime<Tz>) -> DateTime<Tz> {
    let first = t.date_naive().with_day0(0).unwrap_or(t.date_naive());
    at_local(&t.timezone(), first, 0)
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM[:SS]` wall-clock
/// time interpreted in `tz`.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Result<DateTime<Tz>, AttendanceError> {
    let raw = raw.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AttendanceError::InvalidTimestamp(raw.to_string()))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(AttendanceError::InvalidTimestamp(raw.to_string())),
    }
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

// A time skipped by a forward jump is read with the offset in effect before
// the jump, landing on the first instant after it. Ambiguous times take the
// earlier instant.
fn at_local(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN));

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let day_before = naive.checked_sub_days(Days::new(1)).unwrap_or(naive);
            let offset = tz.offset_from_utc_datetime(&day_before).fix();
            tz.from_utc_datetime(&(naive - offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono_tz::America::Sao_Paulo;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Sao_Paulo.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn morning_falls_in_day_window() {
        let w = window_for(&local(2026, 3, 2, 8, 0));
        assert_eq!(w.start, local(2026, 3, 2, 7, 0));
        assert_eq!(w.end, local(2026, 3, 2, 19, 0));
    }

    #[test]
    fn evening_falls_in_night_window_ending_next_morning() {
        let w = window_for(&local(2026, 3, 2, 19, 30));
        assert_eq!(w.start, local(2026, 3, 2, 19, 0));
        assert_eq!(w.end, local(2026, 3, 3, 7, 0));
    }

    #[test]
    fn early_morning_belongs_to_previous_night() {
        let w = window_for(&local(2026, 3, 2, 6, 30));
        assert_eq!(w.start, local(2026, 3, 1, 19, 0));
        assert_eq!(w.end, local(2026, 3, 2, 7, 0));
    }

    #[test]
    fn anchors_start_a_new_window() {
        let day = window_for(&local(2026, 3, 2, 7, 0));
        assert_eq!(day.start, local(2026, 3, 2, 7, 0));

        let night = window_for(&local(2026, 3, 2, 19, 0));
        assert_eq!(night.start, local(2026, 3, 2, 19, 0));

        let before = window_for(&(local(2026, 3, 2, 7, 0) - Duration::nanoseconds(1)));
        assert_eq!(before.end, local(2026, 3, 2, 7, 0));
    }

    #[test]
    fn night_window_crosses_month_and_year() {
        let w = window_for(&local(2027, 1, 1, 2, 0));
        assert_eq!(w.start, local(2026, 12, 31, 19, 0));
        assert_eq!(w.end, local(2027, 1, 1, 7, 0));
    }

    #[test]
    fn every_minute_of_two_days_is_covered_by_a_twelve_hour_window() {
        let first = local(2026, 3, 1, 0, 0);
        for minute in 0..(48 * 60) {
            let t = first + Duration::minutes(minute);
            let w = window_for(&t);
            assert!(w.contains(&t), "{t} not in {w:?}");
            assert_eq!(w.end - w.start, Duration::hours(12));
        }
    }

    #[test]
    fn instants_in_the_same_window_agree() {
        let a = window_for(&local(2026, 3, 2, 20, 0));
        let b = window_for(&local(2026, 3, 3, 6, 59));
        assert_eq!(a, b);

        let c = window_for(&local(2026, 3, 3, 7, 0));
        assert_ne!(a, c);
    }

    #[test]
    fn window_is_computed_in_local_time_not_utc() {
        // 09:30 UTC is 06:30 in Sao Paulo
        let t = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 30, 0)
            .unwrap()
            .with_timezone(&Sao_Paulo);
        let w = window_for(&t);
        assert_eq!(w.start_utc(), Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap());
        assert_eq!(w.end_utc(), Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn calendar_boundaries() {
        let t = local(2026, 3, 17, 15, 45);
        assert_eq!(start_of_day(&t), local(2026, 3, 17, 0, 0));

        let month = start_of_month(&t);
        assert_eq!(month, local(2026, 3, 1, 0, 0));
        assert_eq!(month.day(), 1);
    }

    #[test]
    fn day_starts_after_a_midnight_clock_jump() {
        // 2018-11-04 00:00 did not exist in Sao Paulo; clocks went to 01:00 -02
        let t = local(2018, 11, 4, 12, 0);
        let start = start_of_day(&t);

        assert_eq!(start.date_naive(), t.date_naive());
        assert_eq!(start, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());
        assert_eq!(start.hour(), 1);
    }

    #[test]
    fn parse_accepts_rfc3339_and_local_wall_clock() {
        let t = parse_timestamp("2026-03-02T11:00:00Z", Sao_Paulo).unwrap();
        assert_eq!(t, local(2026, 3, 2, 8, 0));

        let t = parse_timestamp("2026-03-02T08:00", Sao_Paulo).unwrap();
        assert_eq!(t, local(2026, 3, 2, 8, 0));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_timestamp("yesterday-ish", Sao_Paulo).unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidTimestamp(_)));
    }
}
