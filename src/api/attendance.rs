use crate::api::error::ErrorBody;
use crate::app_state::AppState;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::{AttendanceRecord, BreakKind};
use actix_web::{HttpResponse, Responder, error::InternalError, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

/// Optional body of the attendance writes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TimestampOverride {
    #[schema(example = "2026-01-05T08:00:00Z")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub success: bool,
    #[schema(example = "Entry registered")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<AttendanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_worked_minutes: Option<i64>,
}

impl AttendanceResponse {
    fn ok(message: impl Into<String>, record: AttendanceRecord) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_worked_minutes: record.total_worked_minutes,
            attendance: Some(record),
        }
    }
}

fn rejected(kind: &'static str, message: &'static str) -> actix_web::Error {
    InternalError::from_response(message, HttpResponse::BadRequest().json(ErrorBody::new(kind, message)))
        .into()
}

/// The clock's instant unless the client supplied one and overrides are enabled.
///
/// An empty body means no override. A body that is not a valid
/// `TimestampOverride` is rejected rather than ignored.
fn resolve_now(body: &[u8], state: &AppState, config: &Config) -> actix_web::Result<DateTime<Utc>> {
    let requested = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<TimestampOverride>(body)
            .map_err(|e| {
                warn!(error = %e, "Rejected malformed attendance body");
                rejected("invalid_timestamp", "Body must be {\"timestamp\": <RFC 3339 instant>}")
            })?
            .timestamp
    };

    match requested {
        None => Ok(state.clock.now()),
        Some(timestamp) if config.allow_time_override => Ok(timestamp),
        Some(_) => {
            warn!("Rejected client timestamp, overrides are disabled");
            Err(rejected(
                "time_override_disabled",
                "Client supplied timestamps are not accepted",
            ))
        }
    }
}

/// Register entry
#[utoipa::path(
    post,
    path = "/api/attendance/entry",
    request_body(content = TimestampOverride, description = "Only honoured when ALLOW_TIME_OVERRIDE is on"),
    responses(
        (status = 200, description = "Entry registered", body = AttendanceResponse),
        (status = 400, description = "Entry already registered today", body = ErrorBody),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee inactive or not an employee token", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 503, description = "Attendance store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn register_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let now = resolve_now(&body, &state, &config)?;

    let record = state.tracker.register_entry(employee_id, now).await?;
    Ok(HttpResponse::Ok().json(AttendanceResponse::ok("Entry registered", record)))
}

/// Start a break
#[utoipa::path(
    post,
    path = "/api/attendance/breaks/{kind}/start",
    params(
        ("kind" = BreakKind, Path, description = "smoking or lunch")
    ),
    request_body(content = TimestampOverride, description = "Only honoured when ALLOW_TIME_OVERRIDE is on"),
    responses(
        (status = 200, description = "Break started", body = AttendanceResponse),
        (status = 400, description = "No entry yet, break already started, already exited or out of order", body = ErrorBody),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Attendance store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn start_break(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    kind: web::Path<BreakKind>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let kind = kind.into_inner();
    let now = resolve_now(&body, &state, &config)?;

    let record = state.tracker.start_break(employee_id, kind, now).await?;
    Ok(HttpResponse::Ok().json(AttendanceResponse::ok(format!("The {} break started", kind), record)))
}

/// End a break
#[utoipa::path(
    post,
    path = "/api/attendance/breaks/{kind}/end",
    params(
        ("kind" = BreakKind, Path, description = "smoking or lunch")
    ),
    request_body(content = TimestampOverride, description = "Only honoured when ALLOW_TIME_OVERRIDE is on"),
    responses(
        (status = 200, description = "Break ended", body = AttendanceResponse),
        (status = 400, description = "Break not started, already ended, already exited or out of order", body = ErrorBody),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Attendance store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn end_break(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    kind: web::Path<BreakKind>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let kind = kind.into_inner();
    let now = resolve_now(&body, &state, &config)?;

    let record = state.tracker.end_break(employee_id, kind, now).await?;
    Ok(HttpResponse::Ok().json(AttendanceResponse::ok(format!("The {} break ended", kind), record)))
}

/// Register exit; the response carries the worked minutes
#[utoipa::path(
    post,
    path = "/api/attendance/exit",
    request_body(content = TimestampOverride, description = "Only honoured when ALLOW_TIME_OVERRIDE is on"),
    responses(
        (status = 200, description = "Exit registered", body = AttendanceResponse, example = json!({
            "success": true,
            "message": "Exit registered",
            "attendance": {
                "employee_id": 1,
                "date": "2026-01-05",
                "entry_time": "2026-01-05T08:00:00Z",
                "smoking_break": { "start": null, "end": null },
                "lunch_break": { "start": "2026-01-05T09:00:00Z", "end": "2026-01-05T09:30:00Z" },
                "exit_time": "2026-01-05T16:00:00Z",
                "total_worked_minutes": 450
            },
            "total_worked_minutes": 450
        })),
        (status = 400, description = "No entry yet, already exited or out of order", body = ErrorBody),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Attendance store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn register_exit(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let now = resolve_now(&body, &state, &config)?;

    let record = state.tracker.register_exit(employee_id, now).await?;
    Ok(HttpResponse::Ok().json(AttendanceResponse::ok("Exit registered", record)))
}

/// Today's record for the calling employee
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, absent when nothing was registered", body = AttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Attendance store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let today = state.tracker.local_date(state.clock.now());

    let response = match state.tracker.get_today(employee_id, today).await? {
        Some(record) => AttendanceResponse::ok("Attendance for today", record),
        None => AttendanceResponse {
            success: true,
            message: "No attendance registered today".to_string(),
            attendance: None,
            total_worked_minutes: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
