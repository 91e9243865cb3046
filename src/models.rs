use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::{Employee, Sector};

#[derive(Deserialize, ToSchema)]
pub struct EmployeeLoginDto {
    #[schema(example = "12345678A")]
    pub document_number: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminLoginDto {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

/// Profile returned to an employee on login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeProfile {
    pub id: u64,
    pub full_name: String,
    pub document_number: String,
    pub sector: Sector,
}

impl From<&Employee> for EmployeeProfile {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
            document_number: employee.document_number.clone(),
            sector: employee.sector,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    /// Present only for employee tokens
    pub employee_id: Option<u64>,
}
