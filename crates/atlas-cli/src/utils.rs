use std::{
    fmt::Display,
    sync::{LazyLock, PoisonError, RwLock},
};

use atlas_config::config::Config;
use atlas_db::{ConnectionOptions, DbConnection};
use nu_ansi_term::Color;
use tracing::debug;

use crate::error::AtlasResult;

pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const PENDING: &str = "○";
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn set_color(enabled: bool) {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub fn color_enabled() -> bool {
    *COLOR.read().unwrap_or_else(PoisonError::into_inner)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if color_enabled() {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Opens the configured database file.
pub fn open_database(config: &Config, run_migrations: bool) -> AtlasResult<DbConnection> {
    let path = config.database_path();
    debug!("using database at {}", path.display());

    let options = ConnectionOptions {
        busy_timeout: config.busy_timeout(),
        run_migrations,
    };
    Ok(DbConnection::open(path, &options)?)
}
