use atlas_config::config::Config;
use atlas_db::seed::seed_continents;
use nu_ansi_term::Color::Green;
use tracing::info;

use crate::{
    error::AtlasResult,
    utils::{open_database, Colored},
};

pub fn seed(config: &Config) -> AtlasResult<()> {
    let mut db = open_database(config, config.auto_migrate())?;
    let inserted = seed_continents(db.conn())?;
    info!("Loaded {} continents", Colored(Green, inserted));
    Ok(())
}
