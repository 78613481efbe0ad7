use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::AttendanceError,
    ledger::AttendanceView,
    period::{self, WindowView},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub shift_id: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckOutReq {
    #[schema(example = 12)]
    pub attendance_id: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckOutResponse {
    pub id: u64,
    #[schema(example = 8.5)]
    pub hours_worked: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// RFC 3339 or local `YYYY-MM-DDTHH:MM:SS`; defaults to now
    pub at: Option<String>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 201, description = "Check-in recorded", body = Object, example = json!({
            "message": "Check-in recorded", "id": 12
        })),
        (status = 404, description = "User or shift not found", body = Object, example = json!({
            "message": "Shift 9 not found"
        })),
        (status = 409, description = "Already checked in for this period", body = Object, example = json!({
            "message": "User 1 already checked in for the period starting 2026-03-02 10:00:00 UTC"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    state: web::Data<AppState>,
    payload: web::Json<CheckInReq>,
) -> Result<impl Responder, AttendanceError> {
    let id = state
        .ledger
        .check_in(payload.user_id, payload.shift_id, state.clock.now())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Check-in recorded",
        "id": id
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/attendance/check-out",
    request_body = CheckOutReq,
    responses(
        (status = 200, description = "Check-out recorded", body = CheckOutResponse),
        (status = 404, description = "Attendance not found", body = Object, example = json!({
            "message": "Attendance 12 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    state: web::Data<AppState>,
    payload: web::Json<CheckOutReq>,
) -> Result<impl Responder, AttendanceError> {
    let record = state
        .ledger
        .check_out(payload.attendance_id, state.clock.now())
        .await?;

    Ok(HttpResponse::Ok().json(CheckOutResponse {
        id: record.id,
        hours_worked: record.hours_worked,
    }))
}

/// Check-in window containing a timestamp
#[utoipa::path(
    get,
    path = "/attendance/window",
    params(WindowQuery),
    responses(
        (status = 200, description = "Window boundaries", body = WindowView),
        (status = 400, description = "Unparseable timestamp")
    ),
    tag = "Attendance"
)]
pub async fn current_window(
    state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<impl Responder, AttendanceError> {
    let tz = state.ledger.timezone();
    let at = match &query.at {
        Some(raw) => period::parse_timestamp(raw, tz)?,
        None => state.clock.now().with_timezone(&tz),
    };

    Ok(HttpResponse::Ok().json(WindowView::from(period::window_for(&at))))
}

/// List all attendances
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "All attendances, oldest check-in first", body = [AttendanceView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendances(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let views = state.ledger.list().await?;
    Ok(HttpResponse::Ok().json(views))
}
