use crate::{
    api::error::AdminError,
    app_state::AppState,
    auth::auth::AuthUser,
    model::employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee},
    store::StoreError,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub success: bool,
    #[schema(example = "Employee created")]
    pub message: String,
    pub employee: Employee,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub success: bool,
    pub data: Vec<Employee>,
    #[schema(example = 10)]
    pub total: usize,
}

fn validate_new(payload: &NewEmployee) -> Result<(), AdminError> {
    let missing = [
        ("full_name", &payload.full_name),
        ("document_number", &payload.document_number),
        ("social_security_number", &payload.social_security_number),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());

    match missing {
        Some((field, _)) => Err(AdminError::Invalid(format!("{} must not be empty", field))),
        None => Ok(()),
    }
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = EmployeeResponse),
        (status = 400, description = "Missing field or duplicate document number", body = ErrorBody),
        (status = 403, description = "Admin only"),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    validate_new(&payload)?;

    let mut new_employee = payload.into_inner();
    new_employee.document_number = new_employee.document_number.trim().to_string();

    let employee = match state.directory.create(new_employee).await {
        Ok(employee) => employee,
        Err(StoreError::Conflict) => return Err(AdminError::DuplicateDocument.into()),
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            return Err(AdminError::Store(e).into());
        }
    };

    state.document_filter.insert(&employee.document_number);
    info!(employee_id = employee.id, "Employee created");

    Ok(HttpResponse::Created().json(EmployeeResponse {
        success: true,
        message: "Employee created".to_string(),
        employee,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Every employee, active or not", body = EmployeeListResponse),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employees = state.directory.list().await.map_err(|e| {
        error!(error = %e, "Failed to list employees");
        AdminError::Store(e)
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        success: true,
        total: employees.len(),
        data: employees,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/admin/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<EmployeeId>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    match state.directory.get(employee_id).await.map_err(AdminError::Store)? {
        Some(employee) => Ok(HttpResponse::Ok().json(employee)),
        None => Err(AdminError::NotFound("Employee").into()),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/admin/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Employee updated successfully", body = EmployeeResponse),
        (status = 400, description = "Nothing to update", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<EmployeeId>,
    body: web::Json<EmployeeUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    if body.is_empty() {
        return Err(AdminError::Invalid("No fields to update".to_string()).into());
    }

    let employee = state
        .directory
        .update(employee_id, &body)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to update employee");
            AdminError::Store(e)
        })?
        .ok_or(AdminError::NotFound("Employee"))?;

    // the login path must see the new active flag
    state.employee_cache.invalidate(&employee.document_number).await;
    info!(employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        success: true,
        message: "Employee updated".to_string(),
        employee,
    }))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "success": true,
            "message": "Employee deleted"
        })),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<EmployeeId>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    let employee = state
        .directory
        .get(employee_id)
        .await
        .map_err(AdminError::Store)?
        .ok_or(AdminError::NotFound("Employee"))?;

    let deleted = state.directory.delete(employee_id).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to delete employee");
        AdminError::Store(e)
    })?;
    if !deleted {
        return Err(AdminError::NotFound("Employee").into());
    }

    state.employee_cache.invalidate(&employee.document_number).await;
    state.document_filter.remove(&employee.document_number);
    info!(employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Employee deleted"
    })))
}
