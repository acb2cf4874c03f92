//! INSERT statements.

use diesel::{sqlite::Sqlite, QueryResult, QueryableByName, RunQueryDsl, SqliteConnection};

use crate::{
    expr::Col,
    helpers::quote_ident,
    query::{bind_values, clause::push_returning},
    record::Record,
    value::SqlValue,
};

/// An INSERT builder for one or more rows.
///
/// The column list is the union of every row's columns in first-seen order;
/// a row lacking one of them binds `NULL` in its place.
pub struct InsertQuery {
    table: String,
    rows: Vec<Record>,
    returning: Option<Vec<String>>,
}

impl InsertQuery {
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: vec![],
            returning: None,
        }
    }

    /// Sets a column on the current row, starting one if there is none.
    pub fn set<T, V: Into<SqlValue>>(mut self, col: Col<T>, value: V) -> Self {
        if self.rows.is_empty() {
            self.rows.push(Record::new());
        }
        if let Some(row) = self.rows.last_mut() {
            row.set(col.name(), value);
        }
        self
    }

    pub fn values(mut self, row: Record) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Record>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Adds `RETURNING` with the given columns, or `*` when empty.
    pub fn returning<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.returning = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut columns: Vec<&str> = vec![];
        for row in &self.rows {
            for column in row.columns() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }

        let mut params = Vec::with_capacity(self.rows.len() * columns.len());
        let mut sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&self.table))
        } else {
            let tuples: Vec<String> = self
                .rows
                .iter()
                .map(|row| {
                    params.extend(
                        columns
                            .iter()
                            .map(|c| row.get(c).cloned().unwrap_or(SqlValue::Null)),
                    );
                    format!("({})", vec!["?"; columns.len()].join(", "))
                })
                .collect();

            format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_ident(&self.table),
                columns
                    .iter()
                    .map(|c| quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", "),
                tuples.join(", ")
            )
        };

        push_returning(&mut sql, self.returning.as_deref());
        (sql, params)
    }

    /// Runs the insert and returns the number of inserted rows.
    pub fn execute(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        if self.rows.is_empty() {
            return Ok(0);
        }
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).execute(conn)
    }

    /// Runs the insert and loads the `RETURNING` rows.
    pub fn fetch<E: QueryableByName<Sqlite> + 'static>(
        mut self,
        conn: &mut SqliteConnection,
    ) -> QueryResult<Vec<E>> {
        if self.rows.is_empty() {
            return Ok(vec![]);
        }
        if self.returning.is_none() {
            self.returning = Some(vec![]);
        }
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).load(conn)
    }
}
