use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::employee::EmployeeUpdate;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    Date(NaiveDate),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug, PartialEq)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Column names come from code, never from the request body.
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if columns.is_empty() {
        return None;
    }

    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}

/// Columns touched by an employee patch, in a stable order.
pub fn employee_update_columns(update: &EmployeeUpdate) -> Vec<(&'static str, SqlValue)> {
    let mut columns = Vec::new();
    if let Some(full_name) = &update.full_name {
        columns.push(("full_name", SqlValue::String(full_name.clone())));
    }
    if let Some(ssn) = &update.social_security_number {
        columns.push(("social_security_number", SqlValue::String(ssn.clone())));
    }
    if let Some(sector) = update.sector {
        columns.push(("sector", SqlValue::String(sector.as_ref().to_string())));
    }
    if let Some(is_active) = update.is_active {
        columns.push(("is_active", SqlValue::Bool(is_active)));
    }
    columns
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
