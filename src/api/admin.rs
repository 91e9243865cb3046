use std::collections::HashMap;

use crate::{
    api::error::AdminError,
    app_state::AppState,
    auth::auth::AuthUser,
    model::{
        attendance::{AttendanceRecord, WorkedDuration},
        employee::{Employee, EmployeeId, Sector},
    },
    store::RecordFilter,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// Inclusive, `YYYY-MM-DD`
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive, `YYYY-MM-DD`
    #[param(value_type = Option<String>, example = "2026-01-31")]
    pub end_date: Option<NaiveDate>,
    #[param(value_type = Option<u64>)]
    pub employee_id: Option<EmployeeId>,
    #[param(value_type = Option<String>, example = "kitchen")]
    pub sector: Option<Sector>,
}

/// An attendance record joined with the employee it belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceReportRow {
    #[serde(flatten)]
    pub attendance: AttendanceRecord,
    pub full_name: String,
    pub document_number: String,
    pub social_security_number: String,
    pub sector: Sector,
    /// `total_worked_minutes` as `"{h}h {m}m"`
    #[schema(example = "7h 20m")]
    pub worked: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceReport {
    pub success: bool,
    pub data: Vec<AttendanceReportRow>,
    #[schema(example = 1)]
    pub total: usize,
}

/// Joins records with their employees; records whose employee is gone or
/// outside `sector` are dropped.
pub fn build_report(
    records: Vec<AttendanceRecord>,
    employees: &HashMap<EmployeeId, Employee>,
    sector: Option<Sector>,
) -> Vec<AttendanceReportRow> {
    records
        .into_iter()
        .filter_map(|record| {
            let employee = employees.get(&record.employee_id)?;
            if sector.is_some_and(|s| s != employee.sector) {
                return None;
            }
            Some(AttendanceReportRow {
                worked: record
                    .total_worked_minutes
                    .map(|m| WorkedDuration::from(m).to_string()),
                full_name: employee.full_name.clone(),
                document_number: employee.document_number.clone(),
                social_security_number: employee.social_security_number.clone(),
                sector: employee.sector,
                attendance: record,
            })
        })
        .collect()
}

/// Filtered attendance report
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records newest first", body = AttendanceReport),
        (status = 400, description = "start_date after end_date", body = ErrorBody),
        (status = 403, description = "Admin only"),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "Admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_report(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AdminError::Invalid("start_date is after end_date".to_string()).into());
        }
    }

    let filter = RecordFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        employee_id: query.employee_id,
    };
    debug!(?filter, sector = ?query.sector, "Building attendance report");

    let records = state.records.query(&filter).await.map_err(|e| {
        error!(error = %e, "Failed to query attendance");
        AdminError::Store(e)
    })?;
    let employees: HashMap<EmployeeId, Employee> = state
        .directory
        .list()
        .await
        .map_err(AdminError::Store)?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let data = build_report(records, &employees, query.sector);
    Ok(HttpResponse::Ok().json(AttendanceReport {
        success: true,
        total: data.len(),
        data,
    }))
}

/// One employee's record for one day
#[utoipa::path(
    get,
    path = "/api/admin/attendance/{employee_id}/{date}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        ("date" = String, Path, description = "Local day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Record found", body = AttendanceRecord),
        (status = 404, description = "No record for that day", body = ErrorBody),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_for_day(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<(EmployeeId, NaiveDate)>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let (employee_id, date) = path.into_inner();

    match state.tracker.get_today(employee_id, date).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AdminError::NotFound("Attendance record").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, test_app, with_peer};
    use crate::tracker::Clock;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::{Duration, Utc};
    use serde_json::Value;

    fn employee(id: EmployeeId, sector: Sector) -> Employee {
        Employee {
            id,
            full_name: format!("Employee {}", id),
            document_number: format!("0000000{}X", id),
            social_security_number: "280000000000".to_string(),
            sector,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn report_joins_formats_and_filters_by_sector() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut worked = AttendanceRecord::new(1, day);
        worked.total_worked_minutes = Some(440);
        let records = vec![worked, AttendanceRecord::new(2, day), AttendanceRecord::new(3, day)];

        let employees: HashMap<EmployeeId, Employee> = [
            (1, employee(1, Sector::Kitchen)),
            (2, employee(2, Sector::Office)),
        ]
        .into_iter()
        .collect();

        let all = build_report(records.clone(), &employees, None);
        // employee 3 no longer exists
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].worked.as_deref(), Some("7h 20m"));
        assert_eq!(all[1].worked, None);

        let kitchen = build_report(records, &employees, Some(Sector::Kitchen));
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].full_name, "Employee 1");
    }

    #[actix_web::test]
    async fn report_over_http() {
        let ctx = context();
        let hired = ctx.hire("12345678A").await;
        ctx.state.tracker.register_entry(hired.id, ctx.clock.now()).await.unwrap();
        ctx.clock.advance(Duration::minutes(480));
        ctx.state.tracker.register_exit(hired.id, ctx.clock.now()).await.unwrap();

        let token = ctx.admin_token();
        let app = test_app!(ctx);

        let req = with_peer(TestRequest::get().uri("/api/admin/attendance?start_date=2026-03-01&end_date=2026-03-31&sector=kitchen"))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["document_number"], "12345678A");
        assert_eq!(body["data"][0]["total_worked_minutes"], 480);
        assert_eq!(body["data"][0]["worked"], "8h 0m");

        let req = with_peer(TestRequest::get().uri(&format!("/api/admin/attendance/{}/2026-03-02", hired.id)))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_worked_minutes"], 480);

        let req = with_peer(TestRequest::get().uri(&format!("/api/admin/attendance/{}/2026-03-03", hired.id)))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn inverted_range_is_rejected() {
        let ctx = context();
        let token = ctx.admin_token();
        let app = test_app!(ctx);

        let req = with_peer(TestRequest::get().uri("/api/admin/attendance?start_date=2026-03-31&end_date=2026-03-01"))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
