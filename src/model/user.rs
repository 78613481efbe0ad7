use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Maria Souza",
        "email": "11144477735@hercruz.com",
        "cpf": "11144477735",
        "crm": "52946788",
        "role": "on_call",
        "created_at": "2026-01-01T10:00:00Z"
    })
)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub crm: Option<String>,
    pub role: Role,
    /// argon2 PHC string, never serialized
    #[serde(skip_serializing, default)]
    #[schema(write_only)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to persist a new user. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub crm: Option<String>,
    pub role: Role,
    pub password: String,
}

/// Reduce a CPF to its 11 digits, accepting the `XXX.XXX.XXX-XX` mask.
pub fn normalize_cpf(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect();

    if digits.len() == 11 && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cpf_strips_mask() {
        assert_eq!(
            normalize_cpf("114.326.517-30").as_deref(),
            Some("11432651730")
        );
        assert_eq!(normalize_cpf("11432651730").as_deref(), Some("11432651730"));
    }

    #[test]
    fn normalize_cpf_rejects_wrong_length_or_letters() {
        assert_eq!(normalize_cpf("1143265173"), None);
        assert_eq!(normalize_cpf("1143265173a"), None);
        assert_eq!(normalize_cpf(""), None);
    }
}
