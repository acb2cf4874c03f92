//! Synchronising many-to-many join tables with a desired list of rows.

use diesel::{sqlite::Sqlite, QueryableByName, SqliteConnection};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{DbError, Result},
    expr::{Col, RecordEq},
    helpers::chunk,
    query::{DeleteQuery, InsertQuery, SelectQuery},
    record::Record,
    traits::Expression,
    transaction::transaction,
    value::SqlValue,
};

pub const DEFAULT_JOIN_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct EntityListDiff<T> {
    pub new_entries: Vec<T>,
    pub removed_entries: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct UpdateJoinTableParams {
    pub table: String,
    /// Selects the rows owned by the list being synchronised.
    pub filter_criteria: Record,
    /// Columns that identify an entry when comparing old and new rows.
    pub id_fields: Vec<String>,
    /// When set, removed rows are deleted in batches by this column.
    pub primary_key_field: Option<String>,
    pub chunk_size: usize,
}

impl UpdateJoinTableParams {
    pub fn new(table: impl Into<String>, filter_criteria: Record, id_fields: &[&str]) -> Self {
        Self {
            table: table.into(),
            filter_criteria,
            id_fields: id_fields.iter().map(|f| f.to_string()).collect(),
            primary_key_field: None,
            chunk_size: DEFAULT_JOIN_CHUNK_SIZE,
        }
    }

    pub fn primary_key_field(mut self, field: impl Into<String>) -> Self {
        self.primary_key_field = Some(field.into());
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }
}

/// Splits `old` and `new` into entries only present in one of them.
///
/// Two entries are the same when they agree on every field in `id_fields`;
/// a field missing from both counts as agreeing.
pub fn calculate_entity_list_diff<T, S>(old: &[T], new: &[T], id_fields: &[S]) -> Result<EntityListDiff<T>>
where
    T: Serialize + Clone,
    S: AsRef<str>,
{
    let keys = |items: &[T]| -> Result<Vec<Record>> {
        items
            .iter()
            .map(|item| Ok(Record::from_serialize(item)?.pick(id_fields)))
            .collect()
    };
    let old_keys = keys(old)?;
    let new_keys = keys(new)?;

    Ok(EntityListDiff {
        removed_entries: old
            .iter()
            .zip(&old_keys)
            .filter(|(_, key)| missing_from(key, &new_keys, id_fields))
            .map(|(item, _)| item.clone())
            .collect(),
        new_entries: new
            .iter()
            .zip(&new_keys)
            .filter(|(_, key)| missing_from(key, &old_keys, id_fields))
            .map(|(item, _)| item.clone())
            .collect(),
    })
}

fn missing_from<S: AsRef<str>>(key: &Record, others: &[Record], id_fields: &[S]) -> bool {
    !others.iter().any(|other| key.matches_on(other, id_fields))
}

/// Makes the rows matching `params.filter_criteria` equal to `new_list`.
///
/// Inserts missing entries and deletes stale ones in a single transaction;
/// entries present on both sides are left untouched.
pub fn update_join_table<J>(
    conn: &mut SqliteConnection,
    new_list: &[J],
    params: &UpdateJoinTableParams,
) -> Result<EntityListDiff<J>>
where
    J: QueryableByName<Sqlite> + Serialize + Clone + 'static,
{
    if params.chunk_size == 0 {
        return Err(DbError::InvalidChunkSize);
    }

    transaction(conn, |conn| {
        let old_list: Vec<J> = SelectQuery::from(params.table.as_str())
            .filter(RecordEq(params.filter_criteria.clone()))
            .fetch(conn)?;
        let diff = calculate_entity_list_diff(&old_list, new_list, &params.id_fields)?;

        let inserts = diff
            .new_entries
            .iter()
            .map(Record::from_serialize)
            .collect::<Result<Vec<_>>>()?;
        for rows in chunk(&inserts, params.chunk_size) {
            InsertQuery::into(params.table.as_str())
                .rows(rows.iter().cloned())
                .execute(conn)?;
        }

        let removed = diff
            .removed_entries
            .iter()
            .map(Record::from_serialize)
            .collect::<Result<Vec<_>>>()?;

        match &params.primary_key_field {
            Some(pk) => {
                let ids: Vec<SqlValue> = removed
                    .iter()
                    .map(|row| row.get(pk).cloned().unwrap_or(SqlValue::Null))
                    .collect();
                for ids in chunk(&ids, params.chunk_size) {
                    DeleteQuery::from(params.table.as_str())
                        .filter(Col::<SqlValue>::named(pk.clone()).in_(ids.iter().cloned()))
                        .execute(conn)?;
                }
            }
            None => {
                for row in &removed {
                    DeleteQuery::from(params.table.as_str())
                        .filter(RecordEq(params.filter_criteria.clone()))
                        .filter(RecordEq(row.pick(&params.id_fields)))
                        .execute(conn)?;
                }
            }
        }

        debug!(
            table = params.table.as_str(),
            added = diff.new_entries.len(),
            removed = diff.removed_entries.len(),
            "synchronised join table"
        );
        Ok(diff)
    })
}
