use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::auth::AuthUser,
    ledger::{ReportRange, ReportRow, ReportScope},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// `daily` or `monthly`
    #[serde(rename = "type")]
    #[param(value_type = String, example = "daily")]
    pub range: ReportRange,
    /// `general` or `user`
    #[param(value_type = String, example = "general")]
    pub scope: ReportScope,
    /// Required when scope is `user`
    pub user_id: Option<u64>,
}

/// Attendance report
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report rows ordered by check-in", body = [ReportRow]),
        (status = 400, description = "Missing user_id for user scope", body = Object, example = json!({
            "message": "Missing parameter `user_id`"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn report(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rows = state
        .ledger
        .report(query.scope, query.range, query.user_id, state.clock.now())
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}
