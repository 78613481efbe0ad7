use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    attendance::{Attendance, AttendanceFilter, NewAttendance},
    shift::{NewShift, Shift},
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    shifts: BTreeMap<u64, Shift>,
    attendances: BTreeMap<u64, Attendance>,
    /// (user_id, window_start) pairs already used
    windows: HashSet<(u64, DateTime<Utc>)>,
    next_user: u64,
    next_shift: u64,
    next_attendance: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Process-local store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().expect("memory store poisoned");
        f(&*tables)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.write().expect("memory store poisoned");
        f(&mut *tables)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.read(|t| t.users.get(&id).cloned()))
    }

    async fn find_user_by_cpf(&self, cpf: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|t| t.users.values().find(|u| u.cpf == cpf).cloned()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|t| {
            t.users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        }))
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<u64> {
        self.write(|t| {
            if t.users.values().any(|u| u.cpf == user.cpf) {
                return Err(StoreError::Conflict(format!("cpf {}", user.cpf)));
            }
            if t.users
                .values()
                .any(|u| u.email.eq_ignore_ascii_case(&user.email))
            {
                return Err(StoreError::Conflict(format!("email {}", user.email)));
            }

            let id = next_id(&mut t.next_user);
            t.users.insert(
                id,
                User {
                    id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    cpf: user.cpf.clone(),
                    crm: user.crm.clone(),
                    role: user.role,
                    password: user.password.clone(),
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        })
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read(|t| t.users.values().cloned().collect()))
    }

    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>> {
        Ok(self.read(|t| t.shifts.get(&id).cloned()))
    }

    async fn first_shift(&self) -> StoreResult<Option<Shift>> {
        Ok(self.read(|t| t.shifts.values().next().cloned()))
    }

    async fn list_shifts(&self) -> StoreResult<Vec<Shift>> {
        Ok(self.read(|t| t.shifts.values().cloned().collect()))
    }

    async fn insert_shift(&self, shift: &NewShift) -> StoreResult<u64> {
        Ok(self.write(|t| {
            let id = next_id(&mut t.next_shift);
            t.shifts.insert(
                id,
                Shift {
                    id,
                    date: shift.date,
                    shift_type: shift.shift_type,
                    nurse_group: shift.nurse_group.clone(),
                    assigned_users: shift.assigned_users.clone(),
                    created_at: Utc::now(),
                },
            );
            id
        }))
    }

    async fn update_shift(&self, shift: &Shift) -> StoreResult<bool> {
        Ok(self.write(|t| match t.shifts.get_mut(&shift.id) {
            Some(stored) => {
                *stored = shift.clone();
                true
            }
            None => false,
        }))
    }

    async fn delete_shift(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write(|t| t.shifts.remove(&id).is_some()))
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>> {
        Ok(self.read(|t| t.attendances.get(&id).cloned()))
    }

    async fn insert_attendance(&self, attendance: &NewAttendance) -> StoreResult<u64> {
        self.write(|t| {
            if !t
                .windows
                .insert((attendance.user_id, attendance.window_start))
            {
                return Err(StoreError::Conflict(format!(
                    "user {} window {}",
                    attendance.user_id, attendance.window_start
                )));
            }

            let id = next_id(&mut t.next_attendance);
            t.attendances.insert(
                id,
                Attendance {
                    id,
                    user_id: attendance.user_id,
                    shift_id: attendance.shift_id,
                    check_in: attendance.check_in,
                    check_out: None,
                    hours_worked: None,
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        })
    }

    async fn update_attendance(&self, attendance: &Attendance) -> StoreResult<bool> {
        Ok(self.write(|t| match t.attendances.get_mut(&attendance.id) {
            Some(stored) => {
                *stored = attendance.clone();
                true
            }
            None => false,
        }))
    }

    async fn query_attendances(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let mut rows: Vec<Attendance> = self.read(|t| {
            t.attendances
                .values()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect()
        });
        rows.sort_by(|a, b| a.check_in.cmp(&b.check_in).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::model::shift::ShiftType;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn new_user(cpf: &str, email: &str) -> NewUser {
        NewUser {
            name: "Ana".into(),
            email: email.into(),
            cpf: cpf.into(),
            crm: None,
            role: Role::OnCall,
            password: "hash".into(),
        }
    }

    #[actix_web::test]
    async fn duplicate_cpf_or_email_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_user(&new_user("11111111111", "a@x.com"))
            .await
            .unwrap();

        let same_cpf = store.insert_user(&new_user("11111111111", "b@x.com")).await;
        assert!(matches!(same_cpf, Err(StoreError::Conflict(_))));

        let same_email = store.insert_user(&new_user("22222222222", "A@X.com")).await;
        assert!(matches!(same_email, Err(StoreError::Conflict(_))));
    }

    #[actix_web::test]
    async fn attendance_window_is_unique_per_user() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let mut record = NewAttendance {
            user_id: 1,
            shift_id: 1,
            check_in: start,
            window_start: start,
        };

        store.insert_attendance(&record).await.unwrap();
        assert!(matches!(
            store.insert_attendance(&record).await,
            Err(StoreError::Conflict(_))
        ));

        record.user_id = 2;
        assert_eq!(store.insert_attendance(&record).await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn query_orders_by_check_in_then_id() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        for (user_id, offset) in [(1, 5), (2, 1), (3, 1)] {
            let at = base + Duration::hours(offset);
            store
                .insert_attendance(&NewAttendance {
                    user_id,
                    shift_id: 1,
                    check_in: at,
                    window_start: at,
                })
                .await
                .unwrap();
        }

        let rows = store
            .query_attendances(&AttendanceFilter::default())
            .await
            .unwrap();
        let users: Vec<u64> = rows.iter().map(|a| a.user_id).collect();
        assert_eq!(users, vec![2, 3, 1]);
    }

    #[actix_web::test]
    async fn shift_update_and_delete_report_missing_rows() {
        let store = MemoryStore::new();
        let id = store
            .insert_shift(&NewShift {
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                shift_type: ShiftType::Routine,
                nurse_group: None,
                assigned_users: Default::default(),
            })
            .await
            .unwrap();

        let mut shift = store.find_shift(id).await.unwrap().unwrap();
        shift.nurse_group = Some("5-6".into());
        assert!(store.update_shift(&shift).await.unwrap());
        assert_eq!(store.first_shift().await.unwrap(), Some(shift.clone()));

        assert!(store.delete_shift(id).await.unwrap());
        assert!(!store.delete_shift(id).await.unwrap());
        shift.id = 99;
        assert!(!store.update_shift(&shift).await.unwrap());
    }
}
