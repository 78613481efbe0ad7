use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::{AttendanceError, StoreError},
    model::{
        role::Role,
        user::{NewUser, normalize_cpf},
    },
    models::{LoginReqDto, LoginResponse, RegisterCpfReq, ValidateCpfReq, ValidateCpfResponse},
    state::AppState,
};

/// Login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "message": "Email and password required"
        }));
    }

    let db_user = match state.store.find_user_by_email(user.email.trim()).await {
        Ok(Some(u)) => {
            debug!(user_id = u.id, "User found");
            u
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }

    let access_token = match generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(user_id = db_user.id, "Login successful");

    HttpResponse::Ok().json(LoginResponse { access_token })
}

/// Register by CPF
#[utoipa::path(
    post,
    path = "/auth/register-cpf",
    request_body = RegisterCpfReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "User registered", "user_id": 4
        })),
        (status = 400, description = "Malformed CPF or empty name"),
        (status = 409, description = "CPF already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register_cpf(
    payload: web::Json<RegisterCpfReq>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(cpf) = normalize_cpf(&payload.cpf) else {
        return HttpResponse::BadRequest().json(json!({ "message": "CPF must have 11 digits" }));
    };
    let name = payload.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Name must not be empty" }));
    }

    let hashed = match hash_password(&config.default_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash default password");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let new_user = NewUser {
        name: name.to_string(),
        email: format!("{}@{}", cpf, config.email_domain),
        cpf: cpf.clone(),
        crm: payload.crm.clone().filter(|c| !c.trim().is_empty()),
        role: Role::OnCall,
        password: hashed,
    };

    match state.store.insert_user(&new_user).await {
        Ok(user_id) => {
            state.cpf_cache.remember(&cpf, user_id).await;
            info!(user_id, "User registered by CPF");
            HttpResponse::Created().json(json!({
                "message": "User registered",
                "user_id": user_id
            }))
        }
        Err(StoreError::Conflict(_)) => {
            HttpResponse::Conflict().json(json!({ "message": "CPF already registered" }))
        }
        Err(e) => {
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "message": "Failed to register user"
            }))
        }
    }
}

/// Validate CPF and check in
///
/// A known CPF is checked in on the default shift for the current period.
#[utoipa::path(
    post,
    path = "/auth/validate-cpf",
    request_body = ValidateCpfReq,
    responses(
        (status = 200, description = "Lookup result", body = ValidateCpfResponse),
        (status = 400, description = "Malformed CPF"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "validate_cpf", skip_all)]
pub async fn validate_cpf(
    payload: web::Json<ValidateCpfReq>,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let Some(cpf) = normalize_cpf(&payload.cpf) else {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "CPF must have 11 digits" })));
    };

    let unknown = ValidateCpfResponse {
        exists: false,
        user_id: None,
        attendance_id: None,
        message: None,
    };

    let Some(user_id) = state
        .cpf_cache
        .resolve(state.store.as_ref(), &cpf)
        .await
        .map_err(AttendanceError::from)?
    else {
        return Ok(HttpResponse::Ok().json(unknown));
    };

    let Some(shift) = state
        .store
        .first_shift()
        .await
        .map_err(AttendanceError::from)?
    else {
        return Ok(HttpResponse::Ok().json(ValidateCpfResponse {
            exists: true,
            user_id: Some(user_id),
            attendance_id: None,
            message: Some("No shift configured".into()),
        }));
    };

    let response = match state
        .ledger
        .check_in(user_id, shift.id, state.clock.now())
        .await
    {
        Ok(attendance_id) => ValidateCpfResponse {
            exists: true,
            user_id: Some(user_id),
            attendance_id: Some(attendance_id),
            message: Some("Check-in recorded".into()),
        },
        Err(AttendanceError::DuplicateCheckIn { .. }) => ValidateCpfResponse {
            exists: true,
            user_id: Some(user_id),
            attendance_id: None,
            message: Some("Already checked in for this period".into()),
        },
        Err(AttendanceError::ReferenceNotFound { entity: "User", .. }) => {
            // stale cache entry
            state.cpf_cache.forget(&cpf).await;
            unknown
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(response))
}
