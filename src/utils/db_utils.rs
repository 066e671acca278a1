use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// Canonical form used for case-insensitive uniqueness checks on
/// permission/team names and role titles: surrounding whitespace is
/// ignored and case folded before comparing against `LOWER(column)`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// ===============================
/// SQL bindable value enum
/// ===============================
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

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic PATCH-style UPDATE SQL
/// ===============================
/// Only columns named in `allowed` may appear in the payload; anything
/// else is a field-level validation error, never interpolated into SQL.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: SqlValue,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ErrorBadRequest(format!("Unknown field: {}", key)));
        }
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
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

    // WHERE <id_column> = ?
    values.push(id_value);

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
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

    #[test]
    fn builds_set_clause_for_allowed_fields() {
        let payload = json!({"name": "ops", "description": "Ops team"});
        let update = build_update_sql(
            "teams",
            &payload,
            &["name", "description"],
            "id",
            SqlValue::I64(3),
        )
        .unwrap();

        assert!(update.sql.starts_with("UPDATE teams SET "));
        assert!(update.sql.contains("name = ?"));
        assert!(update.sql.contains("description = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_fields_outside_the_whitelist() {
        let payload = json!({"name": "x", "is_staff": true});
        let err = build_update_sql("teams", &payload, &["name"], "id", SqlValue::I64(1));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_update_sql("teams", &json!({}), &["name"], "id", SqlValue::I64(1)).is_err());
        assert!(build_update_sql("teams", &json!([1]), &["name"], "id", SqlValue::I64(1)).is_err());
    }

    #[test]
    fn name_normalization_folds_case_and_trims() {
        assert_eq!(normalize_name("  Platform  "), "platform");
        assert_eq!(normalize_name("Backend Engineer"), "backend engineer");
        assert_eq!(normalize_name("OPS"), normalize_name("ops"));
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let payload = json!({"birth_date": "1990-04-02"});
        let update = build_update_sql(
            "employees",
            &payload,
            &["birth_date"],
            "id",
            SqlValue::String("4F2A9C01BD37".into()),
        )
        .unwrap();

        assert!(matches!(update.values[0], SqlValue::Date(_)));
        assert!(matches!(update.values[1], SqlValue::String(_)));
    }
}
