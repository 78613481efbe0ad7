use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{CheckInReq, CheckOutReq, CheckOutResponse};
use crate::ledger::{AttendanceView, ReportRange, ReportRow, ReportScope};
use crate::model::{
    attendance::Attendance,
    role::Role,
    shift::{NewShift, Shift, ShiftChanges, ShiftType},
    user::User,
};
use crate::models::{
    LoginReqDto, LoginResponse, RegisterCpfReq, RegisterUserReq, ValidateCpfReq,
    ValidateCpfResponse,
};
use crate::period::WindowView;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shift Attendance API",
        version = "1.0.0",
        description = r#"
## Shift Attendance Tracker

Check-in/check-out tracking for a clinical staff roster.

### Key Features
- **Kiosk**
  - Register by CPF, scan a CPF to check in on the default shift
  - One check-in per user per 12-hour period (07:00-19:00, 19:00-07:00 local)
- **Shifts**
  - Create, update, list and delete day, night and routine shifts
- **Reports**
  - Daily and monthly attendance rows, for everyone or a single user

### Security
Admin endpoints under `/api` require a **JWT Bearer** token from `/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register_cpf,
        crate::auth::handlers::validate_cpf,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::current_window,
        crate::api::attendance::list_attendances,

        crate::api::report::report,

        crate::api::shift::list_shifts,
        crate::api::shift::get_shift,
        crate::api::shift::create_shift,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,

        crate::api::user::create_user,
        crate::api::user::list_users
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            RegisterCpfReq,
            RegisterUserReq,
            ValidateCpfReq,
            ValidateCpfResponse,
            CheckInReq,
            CheckOutReq,
            CheckOutResponse,
            WindowView,
            Attendance,
            AttendanceView,
            ReportRow,
            ReportRange,
            ReportScope,
            Shift,
            ShiftType,
            NewShift,
            ShiftChanges,
            User,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and kiosk registration"),
        (name = "Attendance", description = "Check-in and check-out"),
        (name = "Report", description = "Attendance reports"),
        (name = "Shift", description = "Shift management"),
        (name = "User", description = "User management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_kiosk_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/attendance/check-in"));
        assert!(paths.contains_key("/api/reports"));
        assert!(paths.contains_key("/api/shifts/{shift_id}"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
