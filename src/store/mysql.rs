use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, error};

use super::{
    AdminAccounts, EmployeeDirectory, RecordFilter, RecordStore, StoreError, StoreResult,
    StoredRecord,
};
use crate::model::attendance::{AttendanceRecord, BreakInterval};
use crate::model::employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee, Sector};
use crate::model::user::AdminAccount;
use crate::utils::db_utils::{SqlValue, build_update_sql, employee_update_columns, execute_update};

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    error!(error = %e, "MySQL query failed");
    StoreError::Unavailable(e.to_string())
}

#[derive(FromRow)]
struct AttendanceRow {
    employee_id: u64,
    date: NaiveDate,
    entry_time: Option<DateTime<Utc>>,
    smoking_break_start: Option<DateTime<Utc>>,
    smoking_break_end: Option<DateTime<Utc>>,
    lunch_break_start: Option<DateTime<Utc>>,
    lunch_break_end: Option<DateTime<Utc>>,
    exit_time: Option<DateTime<Utc>>,
    total_worked_minutes: Option<i64>,
    version: u32,
}

impl From<AttendanceRow> for StoredRecord {
    fn from(row: AttendanceRow) -> Self {
        StoredRecord {
            record: AttendanceRecord {
                employee_id: row.employee_id,
                date: row.date,
                entry_time: row.entry_time,
                smoking_break: BreakInterval {
                    start: row.smoking_break_start,
                    end: row.smoking_break_end,
                },
                lunch_break: BreakInterval {
                    start: row.lunch_break_start,
                    end: row.lunch_break_end,
                },
                exit_time: row.exit_time,
                total_worked_minutes: row.total_worked_minutes,
            },
            version: row.version,
        }
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    full_name: String,
    document_number: String,
    social_security_number: String,
    sector: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let sector = Sector::from_str(&row.sector).map_err(|_| {
            StoreError::Unavailable(format!("unknown sector '{}' for employee {}", row.sector, row.id))
        })?;

        Ok(Employee {
            id: row.id,
            full_name: row.full_name,
            document_number: row.document_number,
            social_security_number: row.social_security_number,
            sector,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const ATTENDANCE_COLUMNS: &str = r#"
    employee_id, date, entry_time,
    smoking_break_start, smoking_break_end,
    lunch_break_start, lunch_break_end,
    exit_time, total_worked_minutes, version
"#;

const EMPLOYEE_COLUMNS: &str =
    "id, full_name, document_number, social_security_number, sector, is_active, created_at";

/// MySQL backend for every storage port.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn get(&self, employee_id: EmployeeId, date: NaiveDate) -> StoreResult<Option<StoredRecord>> {
        let sql = format!(
            "SELECT {} FROM attendance WHERE employee_id = ? AND date = ?",
            ATTENDANCE_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(StoredRecord::from))
    }

    async fn put(&self, record: &AttendanceRecord, expected_version: Option<u32>) -> StoreResult<u32> {
        match expected_version {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO attendance
                    (employee_id, date, entry_time,
                     smoking_break_start, smoking_break_end,
                     lunch_break_start, lunch_break_end,
                     exit_time, total_worked_minutes, version)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
                    "#,
                )
                .bind(record.employee_id)
                .bind(record.date)
                .bind(record.entry_time)
                .bind(record.smoking_break.start)
                .bind(record.smoking_break.end)
                .bind(record.lunch_break.start)
                .bind(record.lunch_break.end)
                .bind(record.exit_time)
                .bind(record.total_worked_minutes)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;

                Ok(1)
            }
            Some(expected) => {
                let result = sqlx::query(
                    r#"
                    UPDATE attendance
                    SET entry_time = ?,
                        smoking_break_start = ?, smoking_break_end = ?,
                        lunch_break_start = ?, lunch_break_end = ?,
                        exit_time = ?, total_worked_minutes = ?,
                        version = version + 1
                    WHERE employee_id = ?
                    AND date = ?
                    AND version = ?
                    "#,
                )
                .bind(record.entry_time)
                .bind(record.smoking_break.start)
                .bind(record.smoking_break.end)
                .bind(record.lunch_break.start)
                .bind(record.lunch_break.end)
                .bind(record.exit_time)
                .bind(record.total_worked_minutes)
                .bind(record.employee_id)
                .bind(record.date)
                .bind(expected)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;

                if result.rows_affected() == 0 {
                    debug!(
                        employee_id = record.employee_id,
                        date = %record.date,
                        expected,
                        "Attendance version moved underneath us"
                    );
                    return Err(StoreError::Conflict);
                }

                Ok(expected + 1)
            }
        }
    }

    async fn query(&self, filter: &RecordFilter) -> StoreResult<Vec<AttendanceRecord>> {
        // ---------- build WHERE clause dynamically ----------
        let mut conditions = Vec::new();
        let mut bindings = Vec::new();

        if let Some(start) = filter.start_date {
            conditions.push("date >= ?");
            bindings.push(SqlValue::Date(start));
        }
        if let Some(end) = filter.end_date {
            conditions.push("date <= ?");
            bindings.push(SqlValue::Date(end));
        }
        if let Some(employee_id) = filter.employee_id {
            conditions.push("employee_id = ?");
            bindings.push(SqlValue::U64(employee_id));
        }

        let where_clause = if conditions.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM attendance {} ORDER BY date DESC, employee_id ASC",
            ATTENDANCE_COLUMNS, where_clause
        );
        debug!(sql = %sql, bindings = ?bindings, "Querying attendance");

        let mut query = sqlx::query_as::<_, AttendanceRow>(&sql);
        for value in bindings {
            query = match value {
                SqlValue::Date(v) => query.bind(v),
                SqlValue::U64(v) => query.bind(v),
                SqlValue::String(v) => query.bind(v),
                SqlValue::Bool(v) => query.bind(v),
            };
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx)?;
        Ok(rows
            .into_iter()
            .map(|row| StoredRecord::from(row).record)
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx)
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn get(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(Employee::try_from)
            .transpose()
    }

    async fn find_by_document(&self, document_number: &str) -> StoreResult<Option<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE document_number = ?",
            EMPLOYEE_COLUMNS
        );
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(document_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(Employee::try_from)
            .transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("SELECT {} FROM employees ORDER BY id", EMPLOYEE_COLUMNS);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    async fn create(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (full_name, document_number, social_security_number, sector)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&employee.full_name)
        .bind(&employee.document_number)
        .bind(&employee.social_security_number)
        .bind(employee.sector.as_ref())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let id = result.last_insert_id();
        EmployeeDirectory::get(self, id)
            .await?
            .ok_or_else(|| StoreError::Unavailable(format!("employee {} vanished after insert", id)))
    }

    async fn update(&self, id: EmployeeId, update: &EmployeeUpdate) -> StoreResult<Option<Employee>> {
        if let Some(sql_update) = build_update_sql("employees", employee_update_columns(update), "id", id) {
            execute_update(&self.pool, sql_update)
                .await
                .map_err(map_sqlx)?;
        }

        EmployeeDirectory::get(self, id).await
    }

    async fn delete(&self, id: EmployeeId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminAccounts for MySqlStore {
    async fn find_admin(&self, username: &str) -> StoreResult<Option<AdminAccount>> {
        sqlx::query_as::<_, AdminAccount>(
            "SELECT id, username, password_hash FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn create_admin(&self, username: &str, password_hash: &str) -> StoreResult<AdminAccount> {
        let result = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(AdminAccount {
            id: result.last_insert_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use chrono::TimeZone;

    async fn connect() -> MySqlStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a scratch MySQL database");
        let store = MySqlStore::new(init_db(&url).await.unwrap());
        store.run_migrations().await.unwrap();
        store
    }

    async fn hire(store: &MySqlStore) -> Employee {
        store
            .create(NewEmployee {
                full_name: "Ana Ruiz".into(),
                document_number: uuid::Uuid::new_v4().to_string(),
                social_security_number: "281234567840".into(),
                sector: Sector::Office,
            })
            .await
            .unwrap()
    }

    fn entered(employee_id: EmployeeId) -> AttendanceRecord {
        let entry = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        AttendanceRecord {
            entry_time: Some(entry),
            ..AttendanceRecord::new(employee_id, entry.date_naive())
        }
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL"]
    async fn put_is_compare_and_swap() {
        let store = connect().await;
        let employee = hire(&store).await;
        let record = entered(employee.id);

        assert_eq!(store.put(&record, None).await.unwrap(), 1);
        // second insert for the same (employee, date) hits the unique key
        assert!(matches!(store.put(&record, None).await, Err(StoreError::Conflict)));

        let mut next = record.clone();
        next.exit_time = Some(Utc.with_ymd_and_hms(2026, 3, 2, 16, 0, 0).unwrap());
        assert_eq!(store.put(&next, Some(1)).await.unwrap(), 2);
        assert!(matches!(store.put(&next, Some(1)).await, Err(StoreError::Conflict)));

        let stored = RecordStore::get(&store, employee.id, record.date).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.record.exit_time, next.exit_time);

        EmployeeDirectory::delete(&store, employee.id).await.unwrap();
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL"]
    async fn record_for_a_deleted_employee_is_not_a_conflict() {
        let store = connect().await;
        let employee = hire(&store).await;
        EmployeeDirectory::delete(&store, employee.id).await.unwrap();

        let result = store.put(&entered(employee.id), None).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
