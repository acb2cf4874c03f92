//! Embedded schema migrations.

use diesel::{migration::MigrationSource, sqlite::Sqlite, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{DbError, Result};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

fn migration_error(err: impl std::fmt::Display) -> DbError {
    DbError::MigrationError(err.to_string())
}

/// Applies every pending migration and returns the versions that ran.
pub fn apply_migrations(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let applied: Vec<String> = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(migration_error)?
        .into_iter()
        .map(|version| version.to_string())
        .collect();

    if applied.is_empty() {
        debug!("database schema is up to date");
    } else {
        info!(count = applied.len(), "applied migrations");
    }
    Ok(applied)
}

/// Reverts the most recently applied migration.
pub fn revert_last_migration(conn: &mut SqliteConnection) -> Result<String> {
    let version = conn
        .revert_last_migration(MIGRATIONS)
        .map_err(migration_error)?;
    info!(%version, "reverted migration");
    Ok(version.to_string())
}

/// Lists every embedded migration in order, with whether it has been applied.
pub fn migration_status(conn: &mut SqliteConnection) -> Result<Vec<MigrationStatus>> {
    let applied: Vec<String> = conn
        .applied_migrations()
        .map_err(migration_error)?
        .into_iter()
        .map(|version| version.to_string())
        .collect();

    let mut migrations = <EmbeddedMigrations as MigrationSource<Sqlite>>::migrations(&MIGRATIONS)
        .map_err(migration_error)?;
    migrations.sort_by_key(|m| m.name().version().to_string());

    Ok(migrations
        .iter()
        .map(|migration| {
            let name = migration.name();
            MigrationStatus {
                name: name.to_string(),
                applied: applied.contains(&name.version().to_string()),
            }
        })
        .collect())
}
