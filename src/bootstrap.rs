//! First-run data: a default shift for kiosk scans and an optional admin.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::AdminSeed;
use crate::model::{
    role::Role,
    shift::{NewShift, ShiftType},
    user::{NewUser, normalize_cpf},
};
use crate::store::Store;

pub async fn ensure_defaults(
    store: &dyn Store,
    admin: Option<&AdminSeed>,
    today: NaiveDate,
) -> Result<()> {
    if store.first_shift().await?.is_none() {
        let id = store
            .insert_shift(&NewShift {
                date: today,
                shift_type: ShiftType::DayShift,
                nurse_group: Some("3-4".to_string()),
                assigned_users: Default::default(),
            })
            .await?;
        info!(shift_id = id, %today, "Created default shift");
    }

    if let Some(seed) = admin {
        if store.find_user_by_email(&seed.email).await?.is_none() {
            let cpf = normalize_cpf(&seed.cpf).context("ADMIN_CPF must have 11 digits")?;
            let password = hash_password(&seed.password)
                .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
            let id = store
                .insert_user(&NewUser {
                    name: seed.name.clone(),
                    email: seed.email.clone(),
                    cpf,
                    crm: None,
                    role: Role::Admin,
                    password,
                })
                .await?;
            info!(user_id = id, email = %seed.email, "Created admin user");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::store::MemoryStore;

    fn seed() -> AdminSeed {
        AdminSeed {
            name: "Admin".into(),
            email: "admin@hercruz.com".into(),
            cpf: "000.000.000-00".into(),
            password: "change-me".into(),
        }
    }

    #[actix_web::test]
    async fn creates_shift_and_admin_once() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        ensure_defaults(&store, Some(&seed()), today).await.unwrap();
        ensure_defaults(&store, Some(&seed()), today).await.unwrap();

        let shifts = store.list_shifts().await.unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].shift_type, ShiftType::DayShift);
        assert_eq!(shifts[0].date, today);

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
        assert!(verify_password("change-me", &users[0].password).is_ok());
    }

    #[actix_web::test]
    async fn skips_admin_without_seed() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        ensure_defaults(&store, None, today).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
