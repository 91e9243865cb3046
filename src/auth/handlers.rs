use crate::{
    app_state::AppState,
    auth::{jwt::generate_token, password::verify_password},
    config::Config,
    model::{employee::Employee, role::Role},
    models::{AdminLoginDto, EmployeeLoginDto, EmployeeProfile, LoginResponse},
    store::StoreResult,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};
// auth end points

fn rejected(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "kind": "invalid_credentials",
        "message": message
    }))
}

/// Looks an employee up by document number.
pub async fn find_employee_by_document(
    document_number: &str,
    state: &AppState,
) -> StoreResult<Option<Employee>> {
    // 1️⃣ Cuckoo filter: fast negative
    if !state.document_filter.might_exist(document_number) {
        debug!("Document rejected by filter");
        return Ok(None);
    }

    // 2️⃣ Moka cache: fast positive
    if let Some(employee) = state.employee_cache.get(document_number).await {
        debug!(employee_id = employee.id, "Employee served from cache");
        return Ok(Some(employee));
    }

    // 3️⃣ Directory fallback
    let employee = state.directory.find_by_document(document_number).await?;
    if let Some(employee) = &employee {
        state.employee_cache.insert(employee.clone()).await;
    }
    Ok(employee)
}

#[utoipa::path(
    post,
    path = "/auth/employee",
    request_body = EmployeeLoginDto,
    responses(
        (status = 200, description = "Employee token issued", body = LoginResponse),
        (status = 400, description = "Unknown or inactive employee", body = Object, example = json!({
            "success": false, "kind": "invalid_credentials", "message": "Employee not found"
        })),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_employee_login",
    skip(state, config, body),
    fields(document_number = %body.document_number)
)]
pub async fn employee_login(
    body: web::Json<EmployeeLoginDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Employee login request received");

    let document_number = body.document_number.trim();
    if document_number.is_empty() {
        info!("Validation failed: empty document number");
        return rejected(actix_web::http::StatusCode::BAD_REQUEST, "Document number required");
    }

    let employee = match find_employee_by_document(document_number, &state).await {
        Ok(Some(employee)) if employee.is_active => employee,
        Ok(Some(_)) | Ok(None) => {
            info!("Invalid credentials: employee not found or inactive");
            return rejected(actix_web::http::StatusCode::BAD_REQUEST, "Employee not found");
        }
        Err(e) => {
            error!(error = %e, "Directory error while fetching employee");
            return HttpResponse::ServiceUnavailable().finish();
        }
    };

    let token = match generate_token(
        employee.id,
        employee.document_number.clone(),
        Role::Employee,
        Some(employee.id),
        &config.jwt_secret,
        config.employee_token_ttl,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to sign employee token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(employee_id = employee.id, "Employee login successful");

    HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        employee: Some(EmployeeProfile::from(&employee)),
    })
}

#[utoipa::path(
    post,
    path = "/auth/admin",
    request_body = AdminLoginDto,
    responses(
        (status = 200, description = "Admin token issued", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_admin_login",
    skip(state, config, body),
    fields(username = %body.username)
)]
pub async fn admin_login(
    body: web::Json<AdminLoginDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Admin login request received");

    // 1️⃣ Basic validation
    if body.username.trim().is_empty() || body.password.is_empty() {
        info!("Validation failed: empty username or password");
        return rejected(actix_web::http::StatusCode::BAD_REQUEST, "Username or password required");
    }

    // 2️⃣ Fetch admin
    let admin = match state.admins.find_admin(body.username.trim()).await {
        Ok(Some(admin)) => {
            debug!(admin_id = admin.id, "Admin found");
            admin
        }
        Ok(None) => {
            info!("Invalid credentials: admin not found");
            return rejected(actix_web::http::StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching admin");
            return HttpResponse::ServiceUnavailable().finish();
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&body.password, &admin.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return rejected(actix_web::http::StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    // 4️⃣ Issue token
    let token = match generate_token(
        admin.id,
        admin.username.clone(),
        Role::Admin,
        None,
        &config.jwt_secret,
        config.admin_token_ttl,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to sign admin token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!("Admin login successful");

    HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        employee: None,
    })
}
