//! Dynamically typed SQL values.
//!
//! Queries are assembled at runtime from records whose shape is only known
//! once a struct has been serialized, so bound parameters are carried as
//! [`SqlValue`] and turned into typed diesel binds right before execution.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A single value that can be bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Text form used when grouping rows by a column value.
    pub fn as_key(&self) -> String {
        match self {
            SqlValue::Null => "null".to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Text(s) => write!(f, "'{s}'"),
            other => write!(f, "{}", other.as_key()),
        }
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else {
                    SqlValue::Real(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => SqlValue::Text(s),
            // Nested structures are stored as their JSON text.
            other @ (Value::Array(_) | Value::Object(_)) => SqlValue::Text(other.to_string()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Integer(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_value() {
        assert_eq!(SqlValue::from(json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from(json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(json!(42)), SqlValue::Integer(42));
        assert_eq!(SqlValue::from(json!(1.5)), SqlValue::Real(1.5));
        assert_eq!(SqlValue::from(json!("EU")), SqlValue::Text("EU".into()));
        assert_eq!(
            SqlValue::from(json!(["en", "fr"])),
            SqlValue::Text(r#"["en","fr"]"#.into())
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7_i64)), SqlValue::Integer(7));
    }

    #[test]
    fn test_as_key() {
        assert_eq!(SqlValue::Text("AF".into()).as_key(), "AF");
        assert_eq!(SqlValue::Integer(3).as_key(), "3");
        assert_eq!(SqlValue::Null.as_key(), "null");
    }
}
