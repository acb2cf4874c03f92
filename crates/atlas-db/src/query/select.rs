//! SELECT statements.

use std::marker::PhantomData;

use diesel::{
    sql_types::BigInt, sqlite::Sqlite, QueryResult, QueryableByName, RunQueryDsl,
    SqliteConnection,
};

use crate::{
    expr::column::Col,
    helpers::quote_ident,
    query::{
        bind_values,
        clause::{push_where, select_list, OrderClause, WhereClause},
    },
    traits::Expression,
    value::SqlValue,
};

/// A SELECT builder loading rows into `E`.
///
/// ```rust
/// use atlas_db::{expr::Col, traits::Expression as _, SelectQuery};
/// # #[derive(diesel::QueryableByName)]
/// # struct Country {
/// #     #[diesel(sql_type = diesel::sql_types::Text)]
/// #     country_name: String,
/// # }
///
/// const CONTINENT_CODE: Col<String> = Col::new("continent_code");
/// const COUNTRY_NAME: Col<String> = Col::new("country_name");
///
/// let (sql, params) = SelectQuery::<Country>::from("country")
///     .select(&[COUNTRY_NAME])
///     .filter(CONTINENT_CODE.eq("EU"))
///     .order_by(COUNTRY_NAME, false)
///     .page(2, 10)
///     .build_sql();
///
/// assert_eq!(
///     sql,
///     r#"SELECT "country_name" FROM "country" WHERE "continent_code" = ? ORDER BY "country_name" ASC LIMIT 10 OFFSET 10"#
/// );
/// assert_eq!(params.len(), 1);
/// ```
pub struct SelectQuery<E> {
    table: String,
    columns: Vec<String>,
    wheres: Vec<WhereClause>,
    orders: Vec<OrderClause>,
    limit: Option<u64>,
    offset: Option<u64>,
    _entity: PhantomData<fn() -> E>,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

impl<E> SelectQuery<E> {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            wheres: vec![],
            orders: vec![],
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    pub fn select<T>(mut self, cols: &[Col<T>]) -> Self {
        self.columns.extend(cols.iter().map(|c| c.name().to_string()));
        self
    }

    /// Select columns by name. An empty list selects `*`.
    pub fn columns<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.columns
            .extend(names.iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn filter<Expr: Expression + Send + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    pub fn order_by<T>(mut self, col: Col<T>, desc: bool) -> Self {
        self.orders.push(OrderClause {
            column: col.name().to_string(),
            desc,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// One-based paging: `LIMIT size OFFSET (page - 1) * size`.
    ///
    /// The offset saturates at `i64::MAX`, past which SQLite has no rows.
    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        let max = i64::MAX as u64;
        self.limit = Some(per_page.min(max));
        self.offset = Some(page.saturating_sub(1).saturating_mul(per_page).min(max));
        self
    }

    pub fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = vec![];
        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list(&self.columns),
            quote_ident(&self.table)
        );

        push_where(&mut sql, &self.wheres, &mut params);

        if !self.orders.is_empty() {
            let orders = self
                .orders
                .iter()
                .map(|o| {
                    format!(
                        "{} {}",
                        quote_ident(&o.column),
                        if o.desc { "DESC" } else { "ASC" }
                    )
                })
                .collect::<Vec<_>>();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite only accepts OFFSET after a LIMIT.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        (sql, params)
    }

    fn build_count_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = vec![];
        let mut sql = format!(
            "SELECT COUNT(*) AS \"count\" FROM {}",
            quote_ident(&self.table)
        );
        push_where(&mut sql, &self.wheres, &mut params);
        (sql, params)
    }

    pub fn count(self, conn: &mut SqliteConnection) -> QueryResult<i64> {
        let (sql, params) = self.build_count_sql();
        let row: CountRow = bind_values(&sql, params).get_result(conn)?;
        Ok(row.count)
    }
}

impl<E: QueryableByName<Sqlite> + 'static> SelectQuery<E> {
    pub fn fetch(self, conn: &mut SqliteConnection) -> QueryResult<Vec<E>> {
        let (sql, params) = self.build_sql();
        bind_values(&sql, params).load(conn)
    }

    pub fn fetch_one(self, conn: &mut SqliteConnection) -> QueryResult<Option<E>> {
        let mut results = self.limit(1).fetch(conn)?;
        Ok(results.pop())
    }
}
