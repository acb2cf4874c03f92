//! A configurable CRUD repository over one table.
//!
//! [`Repository`] turns serializable input structs into [`Record`]s, reduces
//! them to the columns its [`RepositoryConfig`] allows for each operation,
//! and runs the resulting statements through the query builder.

use std::{collections::HashSet, marker::PhantomData, time::Duration};

use diesel::{sqlite::Sqlite, QueryableByName, SqliteConnection};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    error::{DbError, Result},
    expr::{Col, RecordEq},
    helpers::chunk,
    query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery},
    record::Record,
    traits::Expression,
    transaction::{require_transaction, transaction, with_busy_timeout},
    value::SqlValue,
};

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// A row type a [`Repository`] can load, with the input types it accepts.
pub trait Entity: QueryableByName<Sqlite> + Send + 'static {
    type New: Serialize;
    type Update: Serialize;
    type Filters: Serialize;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortingParam {
    pub column: String,
    pub order: SortOrder,
}

impl SortingParam {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Per-call overrides for reads.
#[derive(Debug, Clone, Default)]
pub struct GetParams {
    pub columns_to_fetch: Option<Vec<String>>,
    pub sorting: Option<Vec<SortingParam>>,
}

impl GetParams {
    pub fn sorted_by(sorting: Vec<SortingParam>) -> Self {
        Self {
            sorting: Some(sorting),
            ..Default::default()
        }
    }
}

/// One-based page selection. Zero values fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number: if number == 0 { DEFAULT_PAGE_NUMBER } else { number },
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    /// Rows skipped before this page. SQLite takes LIMIT and OFFSET as
    /// signed 64-bit integers, so larger values are rejected.
    pub fn offset(&self) -> Result<u64> {
        let max = i64::MAX as u64;
        if self.size > max {
            return Err(DbError::InvalidPage(format!("page size {} is too large", self.size)));
        }
        self.number
            .saturating_sub(1)
            .checked_mul(self.size)
            .filter(|offset| *offset <= max)
            .ok_or_else(|| {
                DbError::InvalidPage(format!(
                    "page {} of size {} is out of range",
                    self.number, self.size
                ))
            })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateBulkParams {
    pub chunk_size: usize,
}

impl Default for CreateBulkParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateParams {
    /// Upper bound on how long the statement waits for a locked database.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub table_name: String,
    pub id_column: String,
    pub default_order_by: Vec<SortingParam>,
    pub columns_to_fetch: Option<Vec<String>>,
    pub columns_to_fetch_list: Option<Vec<String>>,
    pub columns_to_fetch_details: Option<Vec<String>>,
    pub columns_for_create: Option<Vec<String>>,
    pub columns_for_update: Option<Vec<String>>,
    pub columns_for_filters: Option<Vec<String>>,
    pub throw_on_invalid_columns: bool,
}

fn to_owned_columns(columns: &[&str]) -> Option<Vec<String>> {
    Some(columns.iter().map(|c| c.to_string()).collect())
}

impl RepositoryConfig {
    pub fn new(table_name: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            id_column: id_column.into(),
            default_order_by: vec![],
            columns_to_fetch: None,
            columns_to_fetch_list: None,
            columns_to_fetch_details: None,
            columns_for_create: None,
            columns_for_update: None,
            columns_for_filters: None,
            throw_on_invalid_columns: false,
        }
    }

    pub fn default_order_by(mut self, sorting: Vec<SortingParam>) -> Self {
        self.default_order_by = sorting;
        self
    }

    pub fn columns_to_fetch(mut self, columns: &[&str]) -> Self {
        self.columns_to_fetch = to_owned_columns(columns);
        self
    }

    pub fn columns_to_fetch_list(mut self, columns: &[&str]) -> Self {
        self.columns_to_fetch_list = to_owned_columns(columns);
        self
    }

    pub fn columns_to_fetch_details(mut self, columns: &[&str]) -> Self {
        self.columns_to_fetch_details = to_owned_columns(columns);
        self
    }

    pub fn columns_for_create(mut self, columns: &[&str]) -> Self {
        self.columns_for_create = to_owned_columns(columns);
        self
    }

    pub fn columns_for_update(mut self, columns: &[&str]) -> Self {
        self.columns_for_update = to_owned_columns(columns);
        self
    }

    pub fn columns_for_filters(mut self, columns: &[&str]) -> Self {
        self.columns_for_filters = to_owned_columns(columns);
        self
    }

    pub fn throw_on_invalid_columns(mut self, enabled: bool) -> Self {
        self.throw_on_invalid_columns = enabled;
        self
    }
}

/// Generic repository for the entity type `E`.
///
/// Every operation takes the connection explicitly. Hand it the connection
/// a [`transaction`](crate::transaction::transaction) closure receives to
/// run several operations atomically.
#[derive(Debug, Clone)]
pub struct Repository<E> {
    config: RepositoryConfig,
    /// Whitelist violations are errors; only when some whitelist exists.
    strict: bool,
    /// Columns accepted in ORDER BY and column overrides, when known.
    known_columns: Option<HashSet<String>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(config: RepositoryConfig) -> Self {
        let strict = config.throw_on_invalid_columns
            && (config.columns_for_create.is_some()
                || config.columns_for_update.is_some()
                || config.columns_for_filters.is_some());

        let lists = [
            &config.columns_to_fetch,
            &config.columns_to_fetch_list,
            &config.columns_to_fetch_details,
            &config.columns_for_create,
            &config.columns_for_update,
            &config.columns_for_filters,
        ];
        let known_columns = lists.iter().any(|list| list.is_some()).then(|| {
            lists
                .iter()
                .flat_map(|list| list.iter().flatten())
                .cloned()
                .chain(std::iter::once(config.id_column.clone()))
                .collect::<HashSet<String>>()
        });

        Self {
            config,
            strict,
            known_columns,
            _entity: PhantomData,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn id_col(&self) -> Col<SqlValue> {
        Col::named(self.config.id_column.clone())
    }

    fn list_columns(&self) -> &[String] {
        self.config
            .columns_to_fetch_list
            .as_deref()
            .or(self.config.columns_to_fetch.as_deref())
            .unwrap_or_default()
    }

    fn detail_columns(&self) -> &[String] {
        self.config
            .columns_to_fetch_details
            .as_deref()
            .or(self.config.columns_to_fetch.as_deref())
            .unwrap_or_default()
    }

    /// Reduces `record` to `whitelist`, failing on extra keys in strict mode.
    fn apply_whitelist(&self, record: Record, whitelist: Option<&[String]>) -> Result<Record> {
        match whitelist {
            None => Ok(record),
            Some(columns) if self.strict => record.strict_pick(columns),
            Some(columns) => Ok(record.pick(columns)),
        }
    }

    fn create_record(&self, entity: &E::New) -> Result<Record> {
        self.apply_whitelist(
            Record::from_serialize(entity)?,
            self.config.columns_for_create.as_deref(),
        )
    }

    fn update_record(&self, update: &E::Update) -> Result<Record> {
        let record = self.apply_whitelist(
            Record::from_serialize(update)?,
            self.config.columns_for_update.as_deref(),
        )?;
        if record.is_empty() {
            return Err(DbError::EmptyUpdate);
        }
        Ok(record)
    }

    fn filter_record(&self, filters: Option<&E::Filters>) -> Result<Record> {
        match filters {
            Some(filters) => self.apply_whitelist(
                Record::from_serialize(filters)?,
                self.config.columns_for_filters.as_deref(),
            ),
            None => Ok(Record::new()),
        }
    }

    // SQLite reads an unknown double-quoted identifier as a string literal,
    // so unknown names would be silently ignored rather than rejected.
    fn check_column(&self, column: &str) -> Result<()> {
        match &self.known_columns {
            Some(known) if !known.contains(column) => {
                Err(DbError::InvalidColumn(column.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn select<R>(&self, params: &GetParams, default_columns: &[String]) -> Result<SelectQuery<R>> {
        let columns = match &params.columns_to_fetch {
            Some(columns) => {
                for column in columns {
                    self.check_column(column)?;
                }
                columns.as_slice()
            }
            None => default_columns,
        };

        let sorting = params
            .sorting
            .as_ref()
            .unwrap_or(&self.config.default_order_by);

        let mut query = SelectQuery::<R>::from(self.config.table_name.as_str()).columns(columns);
        for sort in sorting {
            self.check_column(&sort.column)?;
            query = query.order_by(
                Col::<SqlValue>::named(sort.column.clone()),
                sort.order == SortOrder::Desc,
            );
        }
        Ok(query)
    }

    pub fn create(&self, conn: &mut SqliteConnection, entity: &E::New) -> Result<E> {
        let record = self.create_record(entity)?;
        trace!(table = self.config.table_name.as_str(), "creating row");

        InsertQuery::into(self.config.table_name.as_str())
            .values(record)
            .returning(self.detail_columns())
            .fetch::<E>(conn)?
            .pop()
            .ok_or_else(|| DbError::QueryError("insert returned no rows".into()))
    }

    /// Inserts `entities` in chunks and returns the created rows in input order.
    ///
    /// All chunks run in one transaction (a savepoint when nested).
    pub fn create_bulk(
        &self,
        conn: &mut SqliteConnection,
        entities: &[E::New],
        params: CreateBulkParams,
    ) -> Result<Vec<E>> {
        let records = self.bulk_records(entities, params)?;

        transaction(conn, |conn| {
            let mut created = Vec::with_capacity(records.len());
            for rows in chunk(&records, params.chunk_size) {
                created.extend(
                    InsertQuery::into(self.config.table_name.as_str())
                        .rows(rows.iter().cloned())
                        .returning(self.detail_columns())
                        .fetch::<E>(conn)?,
                );
            }
            debug!(table = self.config.table_name.as_str(), count = created.len(), "bulk insert");
            Ok(created)
        })
    }

    /// Like [`Self::create_bulk`] but returns only the number of inserted rows.
    pub fn create_bulk_no_returning(
        &self,
        conn: &mut SqliteConnection,
        entities: &[E::New],
        params: CreateBulkParams,
    ) -> Result<usize> {
        let records = self.bulk_records(entities, params)?;

        transaction(conn, |conn| {
            let mut inserted = 0;
            for rows in chunk(&records, params.chunk_size) {
                inserted += InsertQuery::into(self.config.table_name.as_str())
                    .rows(rows.iter().cloned())
                    .execute(conn)?;
            }
            debug!(table = self.config.table_name.as_str(), count = inserted, "bulk insert");
            Ok(inserted)
        })
    }

    fn bulk_records(&self, entities: &[E::New], params: CreateBulkParams) -> Result<Vec<Record>> {
        if params.chunk_size == 0 {
            return Err(DbError::InvalidChunkSize);
        }
        entities.iter().map(|e| self.create_record(e)).collect()
    }

    pub fn update_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: impl Into<SqlValue>,
        update: &E::Update,
        params: UpdateParams,
    ) -> Result<Option<E>> {
        let record = self.update_record(update)?;
        let query = UpdateQuery::table(self.config.table_name.as_str())
            .set_record(record)
            .filter(self.id_col().eq(id))
            .returning(self.detail_columns());

        let mut rows = match params.timeout {
            Some(timeout) => with_busy_timeout(conn, timeout, |conn| Ok(query.fetch::<E>(conn)?))?,
            None => query.fetch::<E>(conn)?,
        };
        Ok(rows.pop())
    }

    pub fn update_by_criteria(
        &self,
        conn: &mut SqliteConnection,
        filters: &E::Filters,
        update: &E::Update,
    ) -> Result<Vec<E>> {
        let criteria = self.filter_record(Some(filters))?;
        let record = self.update_record(update)?;

        let rows = UpdateQuery::table(self.config.table_name.as_str())
            .set_record(record)
            .filter(RecordEq(criteria))
            .returning(self.detail_columns())
            .fetch::<E>(conn)?;
        Ok(rows)
    }

    /// Updates exactly one row. Any other outcome is rolled back.
    pub fn update_single_by_criteria(
        &self,
        conn: &mut SqliteConnection,
        filters: &E::Filters,
        update: &E::Update,
    ) -> Result<E> {
        transaction(conn, |conn| {
            let mut rows = self.update_by_criteria(conn, filters, update)?;
            match rows.len() {
                1 => rows.pop().ok_or_else(|| unreachable_row("update")),
                0 => Err(DbError::no_entity_exists(
                    "Query updated no rows",
                    self.filter_record(Some(filters))?,
                )),
                _ => Err(DbError::non_unique_result(
                    "Query updated more than one row",
                    self.filter_record(Some(filters))?,
                )),
            }
        })
    }

    pub fn get_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: impl Into<SqlValue>,
        params: &GetParams,
    ) -> Result<Option<E>> {
        let query = self
            .select::<E>(params, self.detail_columns())?
            .filter(self.id_col().eq(id));
        Ok(query.fetch_one(conn)?)
    }

    /// [`Self::get_by_id`] inside a transaction that holds the write lock.
    pub fn get_by_id_for_update(
        &self,
        conn: &mut SqliteConnection,
        id: impl Into<SqlValue>,
        params: &GetParams,
    ) -> Result<Option<E>> {
        require_transaction(conn)?;
        self.get_by_id(conn, id, params)
    }

    pub fn get_by_criteria(
        &self,
        conn: &mut SqliteConnection,
        filters: Option<&E::Filters>,
        params: &GetParams,
        page: Page,
    ) -> Result<Vec<E>> {
        self.get_by_criteria_as::<E>(conn, filters, params, page)
    }

    /// Reads a page of rows into another row type, for column subsets.
    pub fn get_by_criteria_as<R: QueryableByName<Sqlite> + 'static>(
        &self,
        conn: &mut SqliteConnection,
        filters: Option<&E::Filters>,
        params: &GetParams,
        page: Page,
    ) -> Result<Vec<R>> {
        let offset = page.offset()?;
        let criteria = self.filter_record(filters)?;
        let rows = self
            .select::<R>(params, self.list_columns())?
            .filter(RecordEq(criteria))
            .limit(page.size)
            .offset(offset)
            .fetch(conn)?;
        Ok(rows)
    }

    /// Every matching row, read inside a transaction that holds the write lock.
    pub fn get_by_criteria_for_update(
        &self,
        conn: &mut SqliteConnection,
        filters: Option<&E::Filters>,
        params: &GetParams,
    ) -> Result<Vec<E>> {
        require_transaction(conn)?;
        let criteria = self.filter_record(filters)?;
        Ok(self
            .select::<E>(params, self.list_columns())?
            .filter(RecordEq(criteria))
            .fetch(conn)?)
    }

    pub fn get_single_by_criteria(
        &self,
        conn: &mut SqliteConnection,
        filters: &E::Filters,
        params: &GetParams,
    ) -> Result<Option<E>> {
        let criteria = self.filter_record(Some(filters))?;
        let mut rows = self
            .select::<E>(params, self.detail_columns())?
            .filter(RecordEq(criteria.clone()))
            .limit(2)
            .fetch(conn)?;

        if rows.len() > 1 {
            return Err(DbError::non_unique_result(
                "Query resulted more than in a single result",
                criteria,
            ));
        }
        Ok(rows.pop())
    }

    pub fn count_by_criteria(
        &self,
        conn: &mut SqliteConnection,
        filters: Option<&E::Filters>,
    ) -> Result<i64> {
        let criteria = self.filter_record(filters)?;
        Ok(SelectQuery::<E>::from(self.config.table_name.as_str())
            .filter(RecordEq(criteria))
            .count(conn)?)
    }

    pub fn delete_by_id(&self, conn: &mut SqliteConnection, id: impl Into<SqlValue>) -> Result<usize> {
        Ok(DeleteQuery::from(self.config.table_name.as_str())
            .filter(self.id_col().eq(id))
            .execute(conn)?)
    }

    /// Deletes every row matching `filters`; empty filters match all rows.
    pub fn delete_by_criteria(&self, conn: &mut SqliteConnection, filters: &E::Filters) -> Result<usize> {
        let criteria = self.filter_record(Some(filters))?;
        let deleted = DeleteQuery::from(self.config.table_name.as_str())
            .filter(RecordEq(criteria))
            .execute(conn)?;
        debug!(table = self.config.table_name.as_str(), deleted, "deleted rows");
        Ok(deleted)
    }
}

fn unreachable_row(op: &str) -> DbError {
    DbError::QueryError(format!("{op} reported a row that was not returned"))
}
