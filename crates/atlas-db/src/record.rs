//! Column/value maps used for inserts, updates and equality filters.
//!
//! A [`Record`] is the runtime shape of a row fragment. A column that is
//! absent is left untouched by the statement; a column mapped to
//! [`SqlValue::Null`] is written or matched as SQL `NULL`.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{DbError, Result},
    helpers::to_snake_case,
    value::SqlValue,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a struct into a record, normalising keys to snake_case.
    ///
    /// Fields that serde skips are absent from the record.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (to_snake_case(&key), SqlValue::from(value)))
                .collect()),
            other => Err(DbError::InvalidRecord(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Sets `column` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Keeps only the listed columns that are present, in the order given.
    pub fn pick<S: AsRef<str>>(&self, columns: &[S]) -> Record {
        columns
            .iter()
            .filter_map(|column| {
                let column = column.as_ref();
                self.get(column)
                    .map(|value| (column.to_string(), value.clone()))
            })
            .collect()
    }

    /// Fails on the first column that is not in `allowed`.
    pub fn validate_only_whitelisted_fields(&self, allowed: &HashSet<String>) -> Result<()> {
        match self.columns().find(|column| !allowed.contains(*column)) {
            Some(column) => Err(DbError::UnsupportedField(column.to_string())),
            None => Ok(()),
        }
    }

    /// Validates against `columns` and then picks them.
    pub fn strict_pick<S: AsRef<str>>(&self, columns: &[S]) -> Result<Record> {
        let allowed = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self.validate_only_whitelisted_fields(&allowed)?;
        Ok(self.pick(columns))
    }

    /// True when every column in `columns` holds the same value in both records.
    ///
    /// A column missing from both records counts as equal.
    pub fn matches_on<S: AsRef<str>>(&self, other: &Record, columns: &[S]) -> bool {
        columns
            .iter()
            .all(|column| self.get(column.as_ref()) == other.get(column.as_ref()))
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Groups records by the text form of `column`. Records without it go under `"null"`.
pub fn group_by(records: Vec<Record>, column: &str) -> BTreeMap<String, Vec<Record>> {
    let mut groups: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        let key = record
            .get(column)
            .map_or_else(|| SqlValue::Null.as_key(), SqlValue::as_key);
        groups.entry(key).or_default().push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Patch {
        country_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        capital: Option<Option<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        population: Option<i64>,
    }

    #[test]
    fn test_from_serialize_normalises_keys_and_skips_undefined() {
        let patch = Patch {
            country_name: None,
            capital: Some(None),
            population: None,
        };
        let record = Record::from_serialize(&patch).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("country_name"), Some(&SqlValue::Null));
        assert_eq!(record.get("capital"), Some(&SqlValue::Null));
        assert!(!record.contains("population"));
    }

    #[test]
    fn test_from_serialize_rejects_non_objects() {
        let result = Record::from_serialize(&vec![1, 2, 3]);
        assert!(matches!(result, Err(DbError::InvalidRecord(_))));
    }

    #[test]
    fn test_pick() {
        let record = Record::new()
            .with("a", 1)
            .with("b", "two")
            .with("c", SqlValue::Null);

        let picked = record.pick(&["c", "a", "missing"]);
        let columns: Vec<_> = picked.columns().collect();
        assert_eq!(columns, vec!["c", "a"]);
    }

    #[test]
    fn test_strict_pick_rejects_unknown_fields() {
        let record = Record::new().with("country_code", "FR").with("secret", 1);

        let err = record.strict_pick(&["country_code"]).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedField(ref f) if f == "secret"));

        let ok = Record::new()
            .with("country_code", "FR")
            .strict_pick(&["country_code", "continent_code"])
            .unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut record = Record::new().with("a", 1);
        record.set("a", 2);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("a"), Some(&SqlValue::Integer(2)));
    }

    #[test]
    fn test_matches_on() {
        let left = Record::new().with("a", 1).with("b", 2);
        let right = Record::new().with("a", 1).with("b", 3);

        assert!(left.matches_on(&right, &["a"]));
        assert!(!left.matches_on(&right, &["a", "b"]));
        assert!(left.matches_on(&right, &["missing"]));
    }

    #[test]
    fn test_group_by() {
        let records = vec![
            Record::new().with("continent_code", "EU").with("n", 1),
            Record::new().with("continent_code", "AS").with("n", 2),
            Record::new().with("continent_code", "EU").with("n", 3),
            Record::new().with("n", 4),
        ];

        let groups = group_by(records, "continent_code");
        assert_eq!(groups.len(), 3);
        assert_eq!(groups["EU"].len(), 2);
        assert_eq!(groups["AS"].len(), 1);
        assert_eq!(groups["null"].len(), 1);
    }
}
