use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@hercruz.com")]
    pub email: String,
    #[schema(example = "change-me")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Admin-created user.
#[derive(Deserialize, ToSchema)]
pub struct RegisterUserReq {
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "maria@hercruz.com")]
    pub email: String,
    #[schema(example = "111.444.777-35")]
    pub cpf: String,
    #[schema(example = "52946788")]
    pub crm: Option<String>,
    pub role: Role,
    pub password: String,
}

/// Kiosk self-registration by CPF.
#[derive(Deserialize, ToSchema)]
pub struct RegisterCpfReq {
    #[schema(example = "111.444.777-35")]
    pub cpf: String,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "52946788")]
    pub crm: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ValidateCpfReq {
    #[schema(example = "111.444.777-35")]
    pub cpf: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateCpfResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// Attendance opened by this scan, absent when the user already has one
    /// for the current period or no shift exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// email
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
