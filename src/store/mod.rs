//! Persistence collaborator for users, shifts and attendances.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{
    attendance::{Attendance, AttendanceFilter, NewAttendance},
    shift::{NewShift, Shift},
    user::{NewUser, User},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Listings come back ordered by id; attendance queries by `check_in`, then id.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_user_by_cpf(&self, cpf: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::Conflict` when the CPF or email is taken.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<u64>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>>;
    /// Lowest-id shift, used as the default for kiosk check-ins.
    async fn first_shift(&self) -> StoreResult<Option<Shift>>;
    async fn list_shifts(&self) -> StoreResult<Vec<Shift>>;
    async fn insert_shift(&self, shift: &NewShift) -> StoreResult<u64>;
    /// Returns false when no shift has that id.
    async fn update_shift(&self, shift: &Shift) -> StoreResult<bool>;
    /// Returns false when no shift has that id.
    async fn delete_shift(&self, id: u64) -> StoreResult<bool>;

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>>;
    /// Fails with `StoreError::Conflict` when the user already has a record
    /// for `window_start`.
    async fn insert_attendance(&self, attendance: &NewAttendance) -> StoreResult<u64>;
    /// Returns false when no attendance has that id.
    async fn update_attendance(&self, attendance: &Attendance) -> StoreResult<bool>;
    async fn query_attendances(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>>;
}
