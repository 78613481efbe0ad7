use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::info;

use crate::{
    auth::auth::AuthUser,
    model::shift::{NewShift, Shift, ShiftChanges},
    state::AppState,
};

/// List shifts
#[utoipa::path(
    get,
    path = "/api/shifts",
    responses(
        (status = 200, description = "All shifts", body = [Shift]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shift"
)]
pub async fn list_shifts(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let shifts = state.store.list_shifts().await?;
    Ok(HttpResponse::Ok().json(shifts))
}

/// Get shift by ID
#[utoipa::path(
    get,
    path = "/api/shifts/{shift_id}",
    params(
        ("shift_id", Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Shift found", body = Shift),
        (status = 404, description = "Shift not found", body = Object, example = json!({
            "message": "Shift not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shift"
)]
pub async fn get_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();

    Ok(match state.store.find_shift(shift_id).await? {
        Some(shift) => HttpResponse::Ok().json(shift),
        None => HttpResponse::NotFound().json(json!({ "message": "Shift not found" })),
    })
}

/// Create shift
#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = NewShift,
    responses(
        (status = 201, description = "Shift created", body = Object, example = json!({
            "message": "Shift created", "id": 3
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = state.store.insert_shift(&payload).await?;
    info!(shift_id = id, date = %payload.date, "Shift created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Shift created",
        "id": id
    })))
}

/// Update shift
#[utoipa::path(
    put,
    path = "/api/shifts/{shift_id}",
    params(
        ("shift_id", Path, description = "Shift ID")
    ),
    request_body = ShiftChanges,
    responses(
        (status = 200, description = "Shift updated", body = Shift),
        (status = 404, description = "Shift not found", body = Object, example = json!({
            "message": "Shift not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<ShiftChanges>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();

    let Some(mut shift) = state.store.find_shift(shift_id).await? else {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Shift not found" })));
    };

    shift.apply(payload.into_inner());

    if !state.store.update_shift(&shift).await? {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Shift not found" })));
    }

    info!(shift_id, "Shift updated");
    Ok(HttpResponse::Ok().json(shift))
}

/// Delete shift
#[utoipa::path(
    delete,
    path = "/api/shifts/{shift_id}",
    params(
        ("shift_id", Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Shift deleted", body = Object, example = json!({
            "message": "Shift deleted"
        })),
        (status = 404, description = "Shift not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shift"
)]
pub async fn delete_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();

    if !state.store.delete_shift(shift_id).await? {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Shift not found" })));
    }

    info!(shift_id, "Shift deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Shift deleted" })))
}
