use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

pub type EmployeeId = u64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sector {
    Kitchen,
    Office,
    DiningRoom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "Juan Perez Gonzalez",
        "document_number": "12345678A",
        "social_security_number": "281234567890",
        "sector": "kitchen",
        "is_active": true,
        "created_at": "2026-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1, value_type = u64)]
    pub id: EmployeeId,

    #[schema(example = "Juan Perez Gonzalez")]
    pub full_name: String,

    #[schema(example = "12345678A")]
    pub document_number: String,

    #[schema(example = "281234567890")]
    pub social_security_number: String,

    pub sector: Sector,

    #[schema(example = true)]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a new employee.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Maria Garcia Lopez")]
    pub full_name: String,
    #[schema(example = "87654321B")]
    pub document_number: String,
    #[schema(example = "289876543210")]
    pub social_security_number: String,
    pub sector: Sector,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeUpdate {
    pub full_name: Option<String>,
    pub social_security_number: Option<String>,
    pub sector: Option<Sector>,
    pub is_active: Option<bool>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.social_security_number.is_none()
            && self.sector.is_none()
            && self.is_active.is_none()
    }

    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(full_name) = &self.full_name {
            employee.full_name = full_name.clone();
        }
        if let Some(ssn) = &self.social_security_number {
            employee.social_security_number = ssn.clone();
        }
        if let Some(sector) = self.sector {
            employee.sector = sector;
        }
        if let Some(is_active) = self.is_active {
            employee.is_active = is_active;
        }
    }
}
