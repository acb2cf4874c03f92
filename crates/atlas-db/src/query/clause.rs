//! Clause building blocks shared by the query builders.

use crate::{helpers::quote_ident, traits::Expression, value::SqlValue};

/// A WHERE condition, rendered lazily so parameters are collected in order.
pub(crate) struct WhereClause {
    pub sql_fn: Box<dyn Fn(&mut Vec<SqlValue>) -> String + Send>,
}

impl WhereClause {
    pub fn new<E: Expression + Send + 'static>(expr: E) -> Self {
        Self {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        }
    }
}

/// An ORDER BY entry.
pub(crate) struct OrderClause {
    pub column: String,
    pub desc: bool,
}

/// Appends ` WHERE a AND b ..` when there are conditions.
pub(crate) fn push_where(sql: &mut String, wheres: &[WhereClause], params: &mut Vec<SqlValue>) {
    if wheres.is_empty() {
        return;
    }
    let conditions: Vec<String> = wheres.iter().map(|w| (w.sql_fn)(params)).collect();
    sql.push_str(" WHERE ");
    sql.push_str(&conditions.join(" AND "));
}

/// Appends ` RETURNING ..`; an empty list returns every column.
pub(crate) fn push_returning(sql: &mut String, returning: Option<&[String]>) {
    if let Some(columns) = returning {
        sql.push_str(" RETURNING ");
        sql.push_str(&select_list(columns));
    }
}

pub(crate) fn select_list(columns: &[String]) -> String {
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
