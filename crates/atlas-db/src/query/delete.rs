//! DELETE statements.

use diesel::{QueryResult, RunQueryDsl, SqliteConnection};

use crate::{
    helpers::quote_ident,
    query::{
        bind_values,
        clause::{push_where, WhereClause},
    },
    traits::Expression,
    value::SqlValue,
};

pub struct DeleteQuery {
    table: String,
    wheres: Vec<WhereClause>,
}

impl DeleteQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            wheres: Vec::new(),
        }
    }

    pub fn filter<Expr: Expression + Send + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    pub fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", quote_ident(&self.table));
        push_where(&mut sql, &self.wheres, &mut params);
        (sql, params)
    }

    pub fn execute(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).execute(conn)
    }
}
