use diesel::{
    query_builder::{BoxedSqlQuery, SqlQuery},
    sql_query,
    sql_types::{BigInt, Bool, Double, Nullable, Text},
    sqlite::Sqlite,
};

use crate::value::SqlValue;

pub(crate) type BoxedQuery = BoxedSqlQuery<'static, Sqlite, SqlQuery>;

/// Prepares `sql` and binds each value with the SQL type matching its variant.
pub(crate) fn bind_values(sql: &str, params: Vec<SqlValue>) -> BoxedQuery {
    tracing::trace!(sql, params = params.len(), "binding statement");

    params
        .into_iter()
        .fold(sql_query(sql).into_boxed(), |query, value| {
            match value {
                SqlValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
                SqlValue::Bool(b) => query.bind::<Bool, _>(b),
                SqlValue::Integer(i) => query.bind::<BigInt, _>(i),
                SqlValue::Real(f) => query.bind::<Double, _>(f),
                SqlValue::Text(s) => query.bind::<Text, _>(s),
            }
        })
}
