use std::{fs, path::Path};

use atlas_config::config::Config;
use atlas_db::{
    models::{CountryFilters, NewCountry},
    repository::{CountryRepository, CreateBulkParams},
    transaction::transaction,
    SqliteConnection,
};
use nu_ansi_term::Color::Green;
use tracing::{debug, info};

use crate::{
    error::{AtlasResult, ErrorContext},
    utils::{open_database, Colored},
};

pub fn import_countries(
    config: &Config,
    file: &Path,
    chunk_size: usize,
    replace: bool,
) -> AtlasResult<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let countries: Vec<NewCountry> = serde_json::from_str(&content)?;
    debug!("parsed {} countries from {}", countries.len(), file.display());

    let mut db = open_database(config, config.auto_migrate())?;
    let inserted = load_countries(db.conn(), &countries, chunk_size, replace)?;

    info!(
        "Imported {} countries from {}",
        Colored(Green, inserted),
        file.display()
    );
    Ok(())
}

/// Inserts `countries` in one transaction, first clearing the table when `replace` is set.
pub fn load_countries(
    conn: &mut SqliteConnection,
    countries: &[NewCountry],
    chunk_size: usize,
    replace: bool,
) -> AtlasResult<usize> {
    let repo = CountryRepository::repository();

    let inserted = transaction(conn, |conn| {
        if replace {
            let removed = repo.delete_by_criteria(conn, &CountryFilters::default())?;
            info!("Removed {removed} existing countries");
        }
        repo.create_bulk_no_returning(conn, countries, CreateBulkParams { chunk_size })
    })?;
    Ok(inserted)
}
