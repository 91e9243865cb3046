use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{
    AdminAccounts, EmployeeDirectory, RecordFilter, RecordStore, StoreError, StoreResult,
    StoredRecord,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee};
use crate::model::user::AdminAccount;

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    attendance: HashMap<(EmployeeId, NaiveDate), StoredRecord>,
    admins: Vec<AdminAccount>,
    next_employee_id: EmployeeId,
    next_admin_id: u64,
}

/// Process-local backend. Every port call takes the single lock for its
/// whole duration, so each call is atomic; same-key ordering comes from
/// the record versions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, employee_id: EmployeeId, date: NaiveDate) -> StoreResult<Option<StoredRecord>> {
        Ok(self.lock()?.attendance.get(&(employee_id, date)).cloned())
    }

    async fn put(&self, record: &AttendanceRecord, expected_version: Option<u32>) -> StoreResult<u32> {
        let mut tables = self.lock()?;
        let key = (record.employee_id, record.date);

        let version = match (tables.attendance.get(&key), expected_version) {
            (None, None) => 1,
            (Some(stored), Some(expected)) if stored.version == expected => expected + 1,
            _ => return Err(StoreError::Conflict),
        };

        tables.attendance.insert(
            key,
            StoredRecord {
                record: record.clone(),
                version,
            },
        );
        Ok(version)
    }

    async fn query(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>> {
        let tables = self.lock()?;
        let mut records: Vec<AttendanceRecord> = tables
            .attendance
            .values()
            .map(|stored| &stored.record)
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.employee_id.cmp(&b.employee_id)));
        Ok(records)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn get(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self.lock()?.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_document(&self, document_number: &str) -> StoreResult<Option<Employee>> {
        Ok(self
            .lock()?
            .employees
            .iter()
            .find(|e| e.document_number == document_number)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.lock()?.employees.clone())
    }

    async fn create(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.lock()?;
        if tables
            .employees
            .iter()
            .any(|e| e.document_number == employee.document_number)
        {
            return Err(StoreError::Conflict);
        }

        tables.next_employee_id += 1;
        let created = Employee {
            id: tables.next_employee_id,
            full_name: employee.full_name,
            document_number: employee.document_number,
            social_security_number: employee.social_security_number,
            sector: employee.sector,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.employees.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: EmployeeId, update: &EmployeeUpdate) -> StoreResult<Option<Employee>> {
        let mut tables = self.lock()?;
        Ok(tables.employees.iter_mut().find(|e| e.id == id).map(|employee| {
            update.apply_to(employee);
            employee.clone()
        }))
    }

    async fn delete(&self, id: EmployeeId) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.employees.len();
        tables.employees.retain(|e| e.id != id);
        if tables.employees.len() == before {
            return Ok(false);
        }
        tables.attendance.retain(|(employee_id, _), _| *employee_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AdminAccounts for MemoryStore {
    async fn find_admin(&self, username: &str) -> StoreResult<Option<AdminAccount>> {
        Ok(self
            .lock()?
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn create_admin(&self, username: &str, password_hash: &str) -> StoreResult<AdminAccount> {
        let mut tables = self.lock()?;
        if tables.admins.iter().any(|a| a.username == username) {
            return Err(StoreError::Conflict);
        }

        tables.next_admin_id += 1;
        let admin = AdminAccount {
            id: tables.next_admin_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.admins.push(admin.clone());
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Sector;

    fn new_employee(document: &str) -> NewEmployee {
        NewEmployee {
            full_name: "Carlos Martinez Ruiz".to_string(),
            document_number: document.to_string(),
            social_security_number: "281122334455".to_string(),
            sector: Sector::Office,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[actix_web::test]
    async fn put_is_compare_and_swap() {
        let store = MemoryStore::new();
        let record = AttendanceRecord::new(1, day(1));

        assert_eq!(store.put(&record, None).await, Ok(1));
        // a second blind insert loses
        assert_eq!(store.put(&record, None).await, Err(StoreError::Conflict));
        // a stale version loses
        assert_eq!(store.put(&record, Some(0)).await, Err(StoreError::Conflict));
        assert_eq!(store.put(&record, Some(1)).await, Ok(2));

        let stored = RecordStore::get(&store, 1, day(1)).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[actix_web::test]
    async fn update_of_missing_record_conflicts() {
        let store = MemoryStore::new();
        let record = AttendanceRecord::new(1, day(1));
        assert_eq!(store.put(&record, Some(1)).await, Err(StoreError::Conflict));
    }

    #[actix_web::test]
    async fn query_sorts_newest_first() {
        let store = MemoryStore::new();
        for (employee_id, d) in [(2, 1), (1, 3), (1, 1), (3, 2)] {
            store
                .put(&AttendanceRecord::new(employee_id, day(d)), None)
                .await
                .unwrap();
        }

        let keys: Vec<(EmployeeId, u32)> = store
            .query(&RecordFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|r| (r.employee_id, chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(keys, vec![(1, 3), (3, 2), (1, 1), (2, 1)]);
    }

    #[actix_web::test]
    async fn duplicate_document_is_rejected() {
        let store = MemoryStore::new();
        store.create(new_employee("12345678A")).await.unwrap();
        assert_eq!(
            store.create(new_employee("12345678A")).await,
            Err(StoreError::Conflict)
        );
    }

    #[actix_web::test]
    async fn deleting_an_employee_drops_their_records() {
        let store = MemoryStore::new();
        let employee = store.create(new_employee("11223344C")).await.unwrap();
        store
            .put(&AttendanceRecord::new(employee.id, day(2)), None)
            .await
            .unwrap();

        assert!(store.delete(employee.id).await.unwrap());
        assert!(!store.delete(employee.id).await.unwrap());
        assert!(RecordStore::get(&store, employee.id, day(2)).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryStore::new();
        let employee = store.create(new_employee("87654321B")).await.unwrap();

        let update = EmployeeUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let updated = store.update(employee.id, &update).await.unwrap().unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.full_name, employee.full_name);
        assert!(store.update(999, &update).await.unwrap().is_none());
    }
}
