use crate::api::admin::{AttendanceReport, AttendanceReportRow};
use crate::api::attendance::{AttendanceResponse, TimestampOverride};
use crate::api::employee::{EmployeeListResponse, EmployeeResponse};
use crate::api::error::ErrorBody;
use crate::model::attendance::{AttendanceRecord, BreakInterval, BreakKind};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee, Sector};
use crate::models::{AdminLoginDto, EmployeeLoginDto, EmployeeProfile, LoginResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "1.0.0",
        description = r#"
## Employee time attendance

Employees log in with their document number and register, for the current
day, their **entry**, a **smoking** break, a **lunch** break and their
**exit**. Worked minutes are computed once, at exit:

`exit - entry - (closed breaks)`, rounded to the nearest minute and never negative.
A break still open at exit is not deducted.

### 🔐 Security
Attendance and admin endpoints need a **JWT Bearer** token from `/auth/employee`
or `/auth/admin`. Admin endpoints reject employee tokens.

### 📦 Response Format
- `{ success, message, attendance?, total_worked_minutes? }` on success
- `{ success: false, kind, message }` on rejection, `kind` in snake_case
"#,
    ),
    paths(
        crate::auth::handlers::employee_login,
        crate::auth::handlers::admin_login,

        crate::api::attendance::register_entry,
        crate::api::attendance::start_break,
        crate::api::attendance::end_break,
        crate::api::attendance::register_exit,
        crate::api::attendance::today,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::admin::attendance_report,
        crate::api::admin::attendance_for_day,

        crate::api::health::health
    ),
    components(
        schemas(
            EmployeeLoginDto,
            AdminLoginDto,
            EmployeeProfile,
            LoginResponse,
            TimestampOverride,
            AttendanceResponse,
            AttendanceRecord,
            BreakInterval,
            BreakKind,
            ErrorBody,
            Employee,
            NewEmployee,
            EmployeeUpdate,
            Sector,
            EmployeeResponse,
            EmployeeListResponse,
            AttendanceReport,
            AttendanceReportRow
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Employee and admin login"),
        (name = "Attendance", description = "Daily entry, breaks and exit"),
        (name = "Employee", description = "Employee administration"),
        (name = "Admin", description = "Attendance reports"),
        (name = "Health", description = "Service liveness"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document with the protected paths moved under `api_prefix`.
    pub fn with_prefix(api_prefix: &str) -> openapi::OpenApi {
        let mut doc = Self::openapi();
        let prefix = api_prefix.trim_end_matches('/');
        doc.paths.paths = std::mem::take(&mut doc.paths.paths)
            .into_iter()
            .map(|(path, item)| match path.strip_prefix("/api/") {
                Some(rest) => (format!("{}/{}", prefix, rest), item),
                None => (path, item),
            })
            .collect();
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_attendance_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/attendance/exit"));
        assert!(doc.paths.paths.contains_key("/api/attendance/breaks/{kind}/start"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn prefix_follows_configuration() {
        let doc = ApiDoc::with_prefix("/v2/");
        assert!(doc.paths.paths.contains_key("/v2/attendance/entry"));
        assert!(!doc.paths.paths.contains_key("/api/attendance/entry"));
        assert!(doc.paths.paths.contains_key("/auth/employee"));

        let item = &doc.paths.paths["/v2/admin/employees/{id}"];
        let get = &item.operations[&openapi::PathItemType::Get];
        let names: Vec<&str> = get
            .parameters
            .iter()
            .flatten()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["id"]);
    }
}
