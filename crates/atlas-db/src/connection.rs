//! Database connection management.

use std::{fs, path::Path, time::Duration};

use diesel::{sql_query, Connection, RunQueryDsl, SqliteConnection};
use tracing::debug;

use crate::{
    error::Result,
    migration::apply_migrations,
    transaction::set_busy_timeout,
};

#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    pub run_migrations: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            run_migrations: true,
        }
    }
}

/// A SQLite connection with the reference data schema applied.
pub struct DbConnection {
    conn: SqliteConnection,
}

impl DbConnection {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the
    /// connection fails, or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P, options: &ConnectionOptions) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!(path = %path.display(), "opening database");
        let mut conn = SqliteConnection::establish(&path.to_string_lossy())?;

        // WAL mode for better concurrent access
        sql_query("PRAGMA journal_mode = WAL").execute(&mut conn)?;
        Self::configure(conn, options)
    }

    /// A private in-memory database with migrations applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = SqliteConnection::establish(":memory:")?;
        Self::configure(conn, &ConnectionOptions::default())
    }

    fn configure(mut conn: SqliteConnection, options: &ConnectionOptions) -> Result<Self> {
        set_busy_timeout(&mut conn, options.busy_timeout)?;
        if options.run_migrations {
            apply_migrations(&mut conn)?;
        }
        Ok(Self { conn })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl std::ops::Deref for DbConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl std::ops::DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{migration::migration_status, transaction::busy_timeout};

    #[test]
    fn test_open_creates_parent_dirs_and_migrates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("atlas.db");
        let options = ConnectionOptions {
            busy_timeout: Duration::from_millis(1234),
            run_migrations: true,
        };

        let mut db = DbConnection::open(&path, &options).unwrap();

        assert!(path.exists());
        assert_eq!(busy_timeout(db.conn()).unwrap(), Duration::from_millis(1234));
        assert!(migration_status(db.conn()).unwrap().iter().all(|m| m.applied));
    }

    #[test]
    fn test_open_without_migrations() {
        let dir = TempDir::new().unwrap();
        let options = ConnectionOptions {
            run_migrations: false,
            ..Default::default()
        };

        let mut db = DbConnection::open(dir.path().join("atlas.db"), &options).unwrap();
        assert!(migration_status(db.conn()).unwrap().iter().all(|m| !m.applied));
    }
}
