//! Transaction plumbing on top of diesel's transaction manager.
//!
//! Every repository operation takes a `&mut SqliteConnection`. Passing the
//! connection a transaction closure receives runs the operation inside that
//! transaction; nested calls become savepoints.

use std::time::Duration;

use diesel::{
    connection::{AnsiTransactionManager, TransactionManager},
    sql_query,
    sql_types::Integer,
    Connection, QueryableByName, RunQueryDsl, SqliteConnection,
};
use tracing::debug;

use crate::error::{DbError, Result};

/// Runs `f` in a transaction, committing on `Ok` and rolling back on `Err`.
pub fn transaction<T, F>(conn: &mut SqliteConnection, f: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T>,
{
    conn.transaction(f)
}

/// Like [`transaction`], but takes the database write lock up front.
///
/// SQLite has no row locks; this is what the `*_for_update` reads rely on.
pub fn immediate_transaction<T, F>(conn: &mut SqliteConnection, f: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T>,
{
    conn.immediate_transaction(f)
}

pub fn in_transaction(conn: &mut SqliteConnection) -> bool {
    <AnsiTransactionManager as TransactionManager<SqliteConnection>>::transaction_manager_status_mut(conn)
        .transaction_depth()
        .map(|depth| depth.is_some())
        .unwrap_or(false)
}

pub(crate) fn require_transaction(conn: &mut SqliteConnection) -> Result<()> {
    if in_transaction(conn) {
        Ok(())
    } else {
        Err(DbError::NoActiveTransaction)
    }
}

#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer)]
    timeout: i32,
}

pub fn busy_timeout(conn: &mut SqliteConnection) -> Result<Duration> {
    let row: BusyTimeout = sql_query("PRAGMA busy_timeout").get_result(conn)?;
    Ok(Duration::from_millis(row.timeout.max(0) as u64))
}

pub fn set_busy_timeout(conn: &mut SqliteConnection, timeout: Duration) -> Result<()> {
    let millis = timeout.as_millis().min(i32::MAX as u128);
    sql_query(format!("PRAGMA busy_timeout = {millis}")).execute(conn)?;
    Ok(())
}

/// Runs `f` with the lock wait bounded by `timeout`, then restores the previous value.
pub fn with_busy_timeout<T, F>(conn: &mut SqliteConnection, timeout: Duration, f: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T>,
{
    let previous = busy_timeout(conn)?;
    debug!(?timeout, ?previous, "overriding busy timeout");
    set_busy_timeout(conn, timeout)?;

    let result = f(conn);
    let restored = set_busy_timeout(conn, previous);

    let value = result?;
    restored?;
    Ok(value)
}
