use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{error, info};

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::StoreError,
    model::user::{NewUser, User, normalize_cpf},
    models::RegisterUserReq,
    state::AppState,
};

/// Create user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "User registered", "user_id": 5
        })),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "CPF or email already registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn create_user(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<RegisterUserReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let Some(cpf) = normalize_cpf(&payload.cpf) else {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "CPF must have 11 digits" })));
    };
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name, email and password must not be empty"
        })));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let new_user = NewUser {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        cpf: cpf.clone(),
        crm: payload.crm.clone(),
        role: payload.role,
        password: hashed,
    };

    match state.store.insert_user(&new_user).await {
        Ok(user_id) => {
            state.cpf_cache.remember(&cpf, user_id).await;
            info!(user_id, role = %new_user.role, "User registered");
            Ok(HttpResponse::Created().json(json!({
                "message": "User registered",
                "user_id": user_id
            })))
        }
        Err(StoreError::Conflict(_)) => Ok(HttpResponse::Conflict().json(json!({
            "message": "CPF or email already registered"
        }))),
        Err(e) => Err(e.into()),
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let users = state.store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}
