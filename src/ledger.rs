//! Check-in/check-out rules and report aggregation over the attendance store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;
use futures::lock::Mutex as AsyncMutex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::error::{AttendanceError, StoreError};
use crate::model::attendance::{Attendance, AttendanceFilter, NewAttendance};
use crate::period::{self, Window};
use crate::store::Store;

/// Name shown for attendances whose user no longer resolves.
pub const UNKNOWN_USER: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportRange {
    /// Local midnight today until now
    Daily,
    /// Local midnight on the first of this month until now
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    General,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "user_name": "Maria Souza",
        "check_in": "2026-03-02T08:00:00-03:00",
        "check_out": "2026-03-02T16:30:00-03:00",
        "hours_worked": 8.5
    })
)]
pub struct ReportRow {
    pub user_name: String,
    #[schema(value_type = String, format = DateTime)]
    pub check_in: DateTime<FixedOffset>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub check_out: Option<DateTime<FixedOffset>>,
    pub hours_worked: Option<f64>,
}

/// Attendance listing entry with its user resolved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceView {
    pub id: u64,
    pub user_id: u64,
    pub user_name: String,
    pub shift_id: u64,
    #[schema(value_type = String, format = DateTime)]
    pub check_in: DateTime<FixedOffset>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub check_out: Option<DateTime<FixedOffset>>,
    pub hours_worked: Option<f64>,
}

/// One async mutex per user, serializing the check-then-insert of `check_in`.
#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    fn for_user(&self, user_id: u64) -> Arc<AsyncMutex<()>> {
        self.inner
            .lock()
            .expect("user lock table poisoned")
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// Drop the entry for `user_id` once `lock` was the last handle outside
    /// the table.
    fn release(&self, user_id: u64, lock: Arc<AsyncMutex<()>>) {
        drop(lock);
        let mut table = self.inner.lock().expect("user lock table poisoned");
        if table
            .get(&user_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            table.remove(&user_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().expect("user lock table poisoned").len()
    }
}

pub struct AttendanceLedger {
    store: Arc<dyn Store>,
    tz: Tz,
    locks: UserLocks,
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn Store>, tz: Tz) -> Self {
        Self {
            store,
            tz,
            locks: UserLocks::default(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Check-in window containing `at`, in the configured timezone.
    pub fn window_at(&self, at: DateTime<Utc>) -> Window {
        period::window_for(&at.with_timezone(&self.tz))
    }

    /// Record a check-in at `now` unless the user already has one in the
    /// same window. Returns the new attendance id.
    #[instrument(name = "check_in", skip(self))]
    pub async fn check_in(
        &self,
        user_id: u64,
        shift_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u64, AttendanceError> {
        let window = self.window_at(now);
        debug_assert!(window.contains(&now));

        let lock = self.locks.for_user(user_id);
        let result = {
            let _guard = lock.lock().await;
            self.record_check_in(user_id, shift_id, now, window).await
        };
        self.locks.release(user_id, lock);

        result
    }

    async fn record_check_in(
        &self,
        user_id: u64,
        shift_id: u64,
        now: DateTime<Utc>,
        window: Window,
    ) -> Result<u64, AttendanceError> {
        let window_start = window.start_utc();

        let existing = self
            .store
            .query_attendances(&AttendanceFilter {
                user_id: Some(user_id),
                check_in_from: Some(window_start),
                check_in_until: Some(window.end_utc()),
            })
            .await?;

        if !existing.is_empty() {
            info!(%window_start, "Rejected duplicate check-in");
            return Err(AttendanceError::DuplicateCheckIn {
                user_id,
                window_start,
            });
        }

        if self.store.find_user(user_id).await?.is_none() {
            return Err(AttendanceError::ReferenceNotFound {
                entity: "User",
                id: user_id,
            });
        }
        if self.store.find_shift(shift_id).await?.is_none() {
            return Err(AttendanceError::ReferenceNotFound {
                entity: "Shift",
                id: shift_id,
            });
        }

        let id = self
            .store
            .insert_attendance(&NewAttendance {
                user_id,
                shift_id,
                check_in: now,
                window_start,
            })
            .await
            .map_err(|e| match e {
                // another process won the race for this window
                StoreError::Conflict(_) => AttendanceError::DuplicateCheckIn {
                    user_id,
                    window_start,
                },
                other => other.into(),
            })?;

        info!(attendance_id = id, "Check-in recorded");
        Ok(id)
    }

    /// Close an attendance at `now`. A second call overwrites the first
    /// check-out, and `now` before the check-in yields negative hours.
    #[instrument(name = "check_out", skip(self))]
    pub async fn check_out(
        &self,
        attendance_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Attendance, AttendanceError> {
        let mut record = self
            .store
            .find_attendance(attendance_id)
            .await?
            .ok_or(AttendanceError::NotFound(attendance_id))?;

        if let Some(previous) = record.check_out {
            warn!(%previous, "Overwriting earlier check-out");
        }
        if now < record.check_in {
            warn!(check_in = %record.check_in, "Check-out precedes check-in");
        }

        record.close(now);

        if !self.store.update_attendance(&record).await? {
            return Err(AttendanceError::NotFound(attendance_id));
        }

        info!(hours_worked = ?record.hours_worked, "Check-out recorded");
        Ok(record)
    }

    /// Attendances checked in from the start of the range up to and including
    /// `now`, ordered by check-in time then id.
    pub async fn report(
        &self,
        scope: ReportScope,
        range: ReportRange,
        user_id: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReportRow>, AttendanceError> {
        let user_id = match scope {
            ReportScope::General => None,
            ReportScope::User => Some(user_id.ok_or(AttendanceError::MissingParameter("user_id"))?),
        };

        let local_now = now.with_timezone(&self.tz);
        let from = match range {
            ReportRange::Daily => period::start_of_day(&local_now),
            ReportRange::Monthly => period::start_of_month(&local_now),
        };

        let records = self
            .store
            .query_attendances(&AttendanceFilter {
                user_id,
                check_in_from: Some(from.with_timezone(&Utc)),
                // inclusive of `now`; stored timestamps keep microseconds
                check_in_until: Some(now + Duration::microseconds(1)),
            })
            .await?;

        let mut names = NameCache::new(self.store.as_ref());
        let mut rows = Vec::with_capacity(records.len());
        for a in records {
            rows.push(ReportRow {
                user_name: names.resolve(a.user_id).await?,
                check_in: self.local(a.check_in),
                check_out: a.check_out.map(|t| self.local(t)),
                hours_worked: a.hours_worked,
            });
        }

        Ok(rows)
    }

    /// Every stored attendance, ordered by check-in time then id.
    pub async fn list(&self) -> Result<Vec<AttendanceView>, AttendanceError> {
        let records = self
            .store
            .query_attendances(&AttendanceFilter::default())
            .await?;

        let mut names = NameCache::new(self.store.as_ref());
        let mut views = Vec::with_capacity(records.len());
        for a in records {
            views.push(AttendanceView {
                id: a.id,
                user_id: a.user_id,
                user_name: names.resolve(a.user_id).await?,
                shift_id: a.shift_id,
                check_in: self.local(a.check_in),
                check_out: a.check_out.map(|t| self.local(t)),
                hours_worked: a.hours_worked,
            });
        }

        Ok(views)
    }

    fn local(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.tz).fixed_offset()
    }
}

struct NameCache<'a> {
    store: &'a dyn Store,
    names: HashMap<u64, String>,
}

impl<'a> NameCache<'a> {
    fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            names: HashMap::new(),
        }
    }

    async fn resolve(&mut self, user_id: u64) -> Result<String, StoreError> {
        if let Some(name) = self.names.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self
            .store
            .find_user(user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        self.names.insert(user_id, name.clone());
        Ok(name)
    }
}
