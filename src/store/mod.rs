//! Storage ports and their adapters.
//!
//! The tracker and the HTTP handlers only see these traits; `memory` and
//! `mysql` provide the concrete backends selected by `STORAGE_BACKEND`.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee};
use crate::model::user::AdminAccount;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A compare-and-swap lost the race, or a unique key already exists.
    #[error("Concurrent modification or duplicate key")]
    Conflict,
    #[error("Storage backend failure: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An attendance record together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: AttendanceRecord,
    pub version: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_id: Option<EmployeeId>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.start_date.is_none_or(|start| record.date >= start)
            && self.end_date.is_none_or(|end| record.date <= end)
            && self.employee_id.is_none_or(|id| record.employee_id == id)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, employee_id: EmployeeId, date: NaiveDate) -> StoreResult<Option<StoredRecord>>;

    /// Inserts when `expected_version` is `None`, otherwise updates only if the
    /// stored version still matches. Returns the new version.
    async fn put(&self, record: &AttendanceRecord, expected_version: Option<u32>) -> StoreResult<u32>;

    /// Newest day first, then by employee id.
    async fn query(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn get(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;

    async fn find_by_document(&self, document_number: &str) -> StoreResult<Option<Employee>>;

    async fn list(&self) -> StoreResult<Vec<Employee>>;

    /// Fails with `Conflict` when the document number is taken.
    async fn create(&self, employee: NewEmployee) -> StoreResult<Employee>;

    async fn update(&self, id: EmployeeId, update: &EmployeeUpdate) -> StoreResult<Option<Employee>>;

    /// Also removes the employee's attendance records.
    async fn delete(&self, id: EmployeeId) -> StoreResult<bool>;
}

#[async_trait]
pub trait AdminAccounts: Send + Sync {
    async fn find_admin(&self, username: &str) -> StoreResult<Option<AdminAccount>>;

    async fn create_admin(&self, username: &str, password_hash: &str) -> StoreResult<AdminAccount>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_on(employee_id: EmployeeId, day: u32) -> AttendanceRecord {
        AttendanceRecord::new(employee_id, NaiveDate::from_ymd_opt(2026, 2, day).unwrap())
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RecordFilter::default().matches(&record_on(1, 10)));
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = RecordFilter {
            start_date: NaiveDate::from_ymd_opt(2026, 2, 10),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 12),
            employee_id: None,
        };
        assert!(!filter.matches(&record_on(1, 9)));
        assert!(filter.matches(&record_on(1, 10)));
        assert!(filter.matches(&record_on(1, 12)));
        assert!(!filter.matches(&record_on(1, 13)));
    }

    #[test]
    fn employee_filter() {
        let filter = RecordFilter {
            employee_id: Some(2),
            ..Default::default()
        };
        assert!(filter.matches(&record_on(2, 1)));
        assert!(!filter.matches(&record_on(3, 1)));
    }
}
