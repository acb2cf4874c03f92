//! UPDATE statements.

use diesel::{sqlite::Sqlite, QueryResult, QueryableByName, RunQueryDsl, SqliteConnection};

use crate::{
    expr::Col,
    helpers::quote_ident,
    query::{
        bind_values,
        clause::{push_returning, push_where, WhereClause},
    },
    record::Record,
    traits::Expression,
    value::SqlValue,
};

pub struct UpdateQuery {
    table: String,
    updates: Vec<(String, SqlValue)>,
    wheres: Vec<WhereClause>,
    returning: Option<Vec<String>>,
}

impl UpdateQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            updates: vec![],
            wheres: vec![],
            returning: None,
        }
    }

    pub fn set<T, V: Into<SqlValue>>(mut self, col: Col<T>, value: V) -> Self {
        self.updates.push((col.name().to_string(), value.into()));
        self
    }

    /// Sets every column of `record`.
    pub fn set_record(mut self, record: Record) -> Self {
        self.updates.extend(record);
        self
    }

    pub fn filter<Expr: Expression + Send + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    pub fn returning<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.returning = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();

        let sets: Vec<String> = self
            .updates
            .iter()
            .map(|(col, val)| {
                params.push(val.clone());
                format!("{} = ?", quote_ident(col))
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(&self.table),
            sets.join(", ")
        );
        push_where(&mut sql, &self.wheres, &mut params);
        push_returning(&mut sql, self.returning.as_deref());

        (sql, params)
    }

    pub fn execute(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).execute(conn)
    }

    /// Runs the update and loads the `RETURNING` rows.
    pub fn fetch<E: QueryableByName<Sqlite> + 'static>(
        mut self,
        conn: &mut SqliteConnection,
    ) -> QueryResult<Vec<E>> {
        if self.returning.is_none() {
            self.returning = Some(vec![]);
        }
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).load(conn)
    }
}
