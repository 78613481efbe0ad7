use async_trait::async_trait;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    attendance::{Attendance, AttendanceFilter, NewAttendance},
    shift::{NewShift, Shift},
    user::{NewUser, User},
};

const USER_COLUMNS: &str = "id, name, email, cpf, crm, role, password, created_at";
const SHIFT_COLUMNS: &str = "id, date, shift_type, nurse_group, assigned_users, created_at";
const ATTENDANCE_COLUMNS: &str =
    "id, user_id, shift_id, check_in, check_out, hours_worked, created_at";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &MySqlRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        cpf: row.try_get("cpf")?,
        crm: row.try_get("crm")?,
        role: role
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("unknown role `{role}`")))?,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
    })
}

fn shift_from_row(row: &MySqlRow) -> StoreResult<Shift> {
    let shift_type: String = row.try_get("shift_type")?;
    let assigned: String = row.try_get("assigned_users")?;
    Ok(Shift {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        shift_type: shift_type
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("unknown shift type `{shift_type}`")))?,
        nurse_group: row.try_get("nurse_group")?,
        assigned_users: serde_json::from_str(&assigned)
            .map_err(|e| StoreError::Corrupt(format!("assigned_users: {e}")))?,
        created_at: row.try_get("created_at")?,
    })
}

fn attendance_from_row(row: &MySqlRow) -> StoreResult<Attendance> {
    Ok(Attendance {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        shift_id: row.try_get("shift_id")?,
        check_in: row.try_get("check_in")?,
        check_out: row.try_get("check_out")?,
        hours_worked: row.try_get("hours_worked")?,
        created_at: row.try_get("created_at")?,
    })
}

fn assignees_json(shift_users: &std::collections::BTreeSet<u64>) -> StoreResult<String> {
    serde_json::to_string(shift_users)
        .map_err(|e| StoreError::Corrupt(format!("assigned_users: {e}")))
}

#[async_trait]
impl Store for MySqlStore {
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_cpf(&self, cpf: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE cpf = ?");
        sqlx::query(&sql)
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, cpf, crm, role, password)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.cpf)
        .bind(&user.crm)
        .bind(user.role.as_ref())
        .bind(&user.password)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(result.last_insert_id())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(shift_from_row)
            .transpose()
    }

    async fn first_shift(&self) -> StoreResult<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts ORDER BY id LIMIT 1");
        sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(shift_from_row)
            .transpose()
    }

    async fn list_shifts(&self) -> StoreResult<Vec<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts ORDER BY id");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(shift_from_row)
            .collect()
    }

    async fn insert_shift(&self, shift: &NewShift) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO shifts (date, shift_type, nurse_group, assigned_users)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(shift.date)
        .bind(shift.shift_type.as_ref())
        .bind(&shift.nurse_group)
        .bind(assignees_json(&shift.assigned_users)?)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(result.last_insert_id())
    }

    async fn update_shift(&self, shift: &Shift) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE shifts
            SET date = ?, shift_type = ?, nurse_group = ?, assigned_users = ?
            WHERE id = ?
            "#,
        )
        .bind(shift.date)
        .bind(shift.shift_type.as_ref())
        .bind(&shift.nurse_group)
        .bind(assignees_json(&shift.assigned_users)?)
        .bind(shift.id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        // MySQL reports 0 affected rows for a no-op update, so check existence
        if result.rows_affected() == 0 {
            return Ok(self.find_shift(shift.id).await?.is_some());
        }
        Ok(true)
    }

    async fn delete_shift(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendances WHERE id = ?");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(attendance_from_row)
            .transpose()
    }

    async fn insert_attendance(&self, attendance: &NewAttendance) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendances (user_id, shift_id, check_in, window_start)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(attendance.user_id)
        .bind(attendance.shift_id)
        .bind(attendance.check_in)
        .bind(attendance.window_start)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(result.last_insert_id())
    }

    async fn update_attendance(&self, attendance: &Attendance) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendances
            SET check_out = ?, hours_worked = ?
            WHERE id = ?
            "#,
        )
        .bind(attendance.check_out)
        .bind(attendance.hours_worked)
        .bind(attendance.id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Ok(self.find_attendance(attendance.id).await?.is_some());
        }
        Ok(true)
    }

    async fn query_attendances(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let mut conditions = Vec::new();
        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.check_in_from.is_some() {
            conditions.push("check_in >= ?");
        }
        if filter.check_in_until.is_some() {
            conditions.push("check_in < ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendances {where_clause} ORDER BY check_in, id"
        );
        tracing::debug!(sql = %sql, filter = ?filter, "Querying attendances");

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(from) = filter.check_in_from {
            query = query.bind(from);
        }
        if let Some(until) = filter.check_in_until {
            query = query.bind(until);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(attendance_from_row)
            .collect()
    }
}
