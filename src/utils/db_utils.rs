use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds a dynamic UPDATE from a JSON object payload.
///
/// Only keys present in `allowed_columns` may be updated; anything else is
/// a bad request. Column names are taken from the whitelist, never from the
/// payload, so they are safe to splice into SQL.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed_columns: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    let mut columns = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    for (key, value) in obj {
        let column = allowed_columns
            .iter()
            .find(|c| *c == key)
            .ok_or_else(|| ErrorBadRequest(format!("Unknown field '{}'", key)))?;
        columns.push(format!("{} = ?", column));

        match value {
            Value::String(s) => {
                // Date-looking strings bind as dates so MySQL DATE/DATETIME
                // columns accept them.
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        columns.join(", "),
        id_column
    );

    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["first_name", "hire_date", "phone"];

    #[test]
    fn test_builds_set_clause_from_whitelisted_keys() {
        let payload = json!({"first_name": "Ana", "phone": "+639170000000"});
        let update = build_update_sql("employees", &payload, COLUMNS, "id", 7).unwrap();

        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("first_name = ?"));
        assert!(update.sql.contains("phone = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3); // two fields + id
    }

    #[test]
    fn test_rejects_unknown_column() {
        let payload = json!({"salary": 100});
        assert!(build_update_sql("employees", &payload, COLUMNS, "id", 7).is_err());
    }

    #[test]
    fn test_rejects_empty_payload() {
        let payload = json!({});
        assert!(build_update_sql("employees", &payload, COLUMNS, "id", 7).is_err());
    }

    #[test]
    fn test_rejects_non_object_payload() {
        let payload = json!(["first_name"]);
        assert!(build_update_sql("employees", &payload, COLUMNS, "id", 7).is_err());
    }

    #[test]
    fn test_date_strings_bind_as_dates() {
        let payload = json!({"hire_date": "2024-01-15"});
        let update = build_update_sql("employees", &payload, COLUMNS, "id", 7).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}
