use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub user_id: u64,
    pub shift_id: u64,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    /// Record a check-out at `at`. Overwrites any earlier check-out.
    pub fn close(&mut self, at: DateTime<Utc>) {
        self.check_out = Some(at);
        self.hours_worked = Some(elapsed_hours(self.check_in, at));
    }
}

/// Fractional hours between two instants, keeping sub-second precision.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    let seconds = delta.num_seconds() as f64;
    let nanos = delta.subsec_nanos() as f64;
    (seconds + nanos / 1e9) / 3600.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub user_id: u64,
    pub shift_id: u64,
    pub check_in: DateTime<Utc>,
    /// Start of the check-in window, unique per user in the database.
    pub window_start: DateTime<Utc>,
}

/// Query predicate over stored attendances. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub user_id: Option<u64>,
    /// Inclusive lower bound on `check_in`
    pub check_in_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `check_in`
    pub check_in_until: Option<DateTime<Utc>>,
}

impl AttendanceFilter {
    pub fn matches(&self, a: &Attendance) -> bool {
        self.user_id.is_none_or(|id| a.user_id == id)
            && self.check_in_from.is_none_or(|from| a.check_in >= from)
            && self.check_in_until.is_none_or(|until| a.check_in < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(check_in: DateTime<Utc>) -> Attendance {
        Attendance {
            id: 1,
            user_id: 7,
            shift_id: 1,
            check_in,
            check_out: None,
            hours_worked: None,
            created_at: check_in,
        }
    }

    #[test]
    fn close_computes_fractional_hours() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        let mut a = record(t0);
        a.close(t0 + Duration::minutes(510));

        assert_eq!(a.hours_worked, Some(8.5));
        assert_eq!(a.check_out, Some(t0 + Duration::minutes(510)));
    }

    #[test]
    fn close_keeps_sub_second_precision() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        let hours = elapsed_hours(t0, t0 + Duration::milliseconds(1_800_500));

        assert!((hours - 1_800.5 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn close_before_check_in_goes_negative() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        let mut a = record(t0);
        a.close(t0 - Duration::minutes(30));

        assert_eq!(a.hours_worked, Some(-0.5));
    }

    #[test]
    fn filter_bounds_are_half_open() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let filter = AttendanceFilter {
            user_id: Some(7),
            check_in_from: Some(t0),
            check_in_until: Some(t0 + Duration::hours(12)),
        };

        assert!(filter.matches(&record(t0)));
        assert!(!filter.matches(&record(t0 + Duration::hours(12))));
        assert!(!filter.matches(&record(t0 - Duration::seconds(1))));

        let mut other = record(t0);
        other.user_id = 8;
        assert!(!filter.matches(&other));
    }
}
