use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_DB_PATH: &str = "atlas.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Atlas service configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// SQLite database settings.
    pub database: DatabaseConfig,

    /// Pagination limits applied to list endpoints.
    pub pagination: PaginationConfig,
}

/// HTTP server settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct ServerConfig {
    /// Address the server binds to. Overridden by $HOST.
    /// Default: "localhost"
    pub host: Option<String>,

    /// Port the server listens on. Overridden by $PORT.
    /// Default: 5001
    pub port: Option<u16>,

    /// When true, only read routes are mounted.
    /// Default: true
    pub read_only: Option<bool>,
}

/// SQLite database settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct DatabaseConfig {
    /// Path of the database file. Overridden by $ATLAS_DB.
    /// Default: "atlas.db"
    pub path: Option<String>,

    /// How long a statement waits on a locked database, in milliseconds.
    /// Default: 5000
    pub busy_timeout_ms: Option<u64>,

    /// Apply pending migrations when the database is opened.
    /// Default: true
    pub auto_migrate: Option<bool>,

    /// Reload the continent seed data when the server starts.
    /// Default: false
    pub seed_on_start: Option<bool>,
}

/// Pagination limits
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct PaginationConfig {
    /// Page size used when a request doesn't name one.
    /// Default: 25
    pub default_page_size: Option<u32>,

    /// Upper bound for requested page sizes.
    /// Default: 1000
    pub max_page_size: Option<u32>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("ATLAS_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("atlas.toml"),
    })
});

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn set_config_path(path: impl Into<PathBuf>) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path.into();
}

/// Loads the configuration from [`CONFIG_PATH`] and makes it the global one.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    Ok(())
}

/// Returns the global configuration, falling back to resolved defaults when
/// [`init`] hasn't run.
pub fn get_config() -> Config {
    if let Some(config) = CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return config.clone();
    }

    let mut guard = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(Config::default_config).clone()
}

impl Config {
    /// Fully populated configuration with every default filled in.
    pub fn default_config() -> Self {
        let mut config = Self::default();
        config.fill_defaults();
        config
    }

    /// Reads the file at [`CONFIG_PATH`]; a missing file yields the defaults.
    pub fn new() -> Result<Self> {
        Self::load(&config_path())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    /// Applies environment overrides, fills defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        self.apply_env_overrides()?;
        self.fill_defaults();
        self.validate()
    }

    /// Checks the values without touching the environment.
    pub fn validate(&self) -> Result<()> {
        if self.host().trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        if self.port() == 0 {
            return Err(ConfigError::invalid("server.port", "must be between 1 and 65535"));
        }
        if self.database_path().as_os_str().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }

        let default_size = self.default_page_size();
        let max_size = self.max_page_size();
        if default_size == 0 {
            return Err(ConfigError::invalid(
                "pagination.default_page_size",
                "must be greater than zero",
            ));
        }
        if max_size == 0 {
            return Err(ConfigError::invalid(
                "pagination.max_page_size",
                "must be greater than zero",
            ));
        }
        if default_size > max_size {
            return Err(ConfigError::invalid(
                "pagination.default_page_size",
                format!("{default_size} exceeds max_page_size {max_size}"),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = Some(host);
        }
        if let Ok(port) = std::env::var("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|err| ConfigError::invalid("server.port", format!("$PORT={port}: {err}")))?;
            self.server.port = Some(port);
        }
        if let Ok(path) = std::env::var("ATLAS_DB") {
            self.database.path = Some(path);
        }
        Ok(())
    }

    fn fill_defaults(&mut self) {
        self.server.host.get_or_insert_with(|| DEFAULT_HOST.to_string());
        self.server.port.get_or_insert(DEFAULT_PORT);
        self.server.read_only.get_or_insert(true);

        self.database
            .path
            .get_or_insert_with(|| DEFAULT_DB_PATH.to_string());
        self.database
            .busy_timeout_ms
            .get_or_insert(DEFAULT_BUSY_TIMEOUT_MS);
        self.database.auto_migrate.get_or_insert(true);
        self.database.seed_on_start.get_or_insert(false);

        self.pagination
            .default_page_size
            .get_or_insert(DEFAULT_PAGE_SIZE);
        self.pagination
            .max_page_size
            .get_or_insert(DEFAULT_MAX_PAGE_SIZE);
    }

    pub fn host(&self) -> &str {
        self.server.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn read_only(&self) -> bool {
        self.server.read_only.unwrap_or(true)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.path.as_deref().unwrap_or(DEFAULT_DB_PATH))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(
            self.database
                .busy_timeout_ms
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        )
    }

    pub fn auto_migrate(&self) -> bool {
        self.database.auto_migrate.unwrap_or(true)
    }

    pub fn seed_on_start(&self) -> bool {
        self.database.seed_on_start.unwrap_or(false)
    }

    pub fn default_page_size(&self) -> u32 {
        self.pagination
            .default_page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn max_page_size(&self) -> u32 {
        self.pagination.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE)
    }

    /// Clamps a requested page size into `1..=max_page_size`.
    pub fn clamp_page_size(&self, requested: u64) -> u64 {
        requested.min(u64::from(self.max_page_size())).max(1)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Serializes the configuration with each field's docs as TOML comments.
    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let serialized = toml::to_string_pretty(self)?;
        let mut doc = serialized.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        let root = doc.as_table_mut();
        if let Some(table) = root.get_mut("server").and_then(|item| item.as_table_mut()) {
            annotate_toml_table::<ServerConfig>(table, false)?;
        }
        if let Some(table) = root.get_mut("database").and_then(|item| item.as_table_mut()) {
            annotate_toml_table::<DatabaseConfig>(table, false)?;
        }
        if let Some(table) = root
            .get_mut("pagination")
            .and_then(|item| item.as_table_mut())
        {
            annotate_toml_table::<PaginationConfig>(table, false)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated default configuration to [`CONFIG_PATH`].
///
/// Refuses to overwrite an existing file.
pub fn generate_default_config() -> Result<PathBuf> {
    let path = config_path();

    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.display().to_string()));
    }

    let annotated = Config::default_config().to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&path, annotated.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::without_env;

    const OVERRIDES: [&str; 3] = ["HOST", "PORT", "ATLAS_DB"];

    #[test]
    #[serial]
    fn test_default_config() {
        without_env(&OVERRIDES, || {
            let config = Config::default_config();

            assert_eq!(config.host(), "localhost");
            assert_eq!(config.port(), 5001);
            assert!(config.read_only());
            assert_eq!(config.database_path(), PathBuf::from("atlas.db"));
            assert_eq!(config.busy_timeout(), Duration::from_millis(5000));
            assert!(config.auto_migrate());
            assert!(!config.seed_on_start());
            assert_eq!(config.default_page_size(), 25);
            assert_eq!(config.max_page_size(), 1000);
        });
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        without_env(&OVERRIDES, || {
            let dir = tempdir().unwrap();
            let config = Config::load(&dir.path().join("absent.toml")).unwrap();
            assert_eq!(config.port(), DEFAULT_PORT);
            assert_eq!(config.server.host.as_deref(), Some("localhost"));
        });
    }

    #[test]
    #[serial]
    fn test_partial_file() {
        without_env(&OVERRIDES, || {
            let dir = tempdir().unwrap();
            let path = dir.path().join("atlas.toml");
            fs::write(
                &path,
                "[server]\nport = 8080\nread_only = false\n\n[pagination]\nmax_page_size = 50\n",
            )
            .unwrap();

            let config = Config::load(&path).unwrap();
            assert_eq!(config.port(), 8080);
            assert!(!config.read_only());
            assert_eq!(config.host(), "localhost");
            assert_eq!(config.max_page_size(), 50);
            assert_eq!(config.clamp_page_size(500), 50);
            assert_eq!(config.clamp_page_size(0), 1);
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.toml");
        fs::write(&path, "[server]\nhost = \"127.0.0.1\"\nport = 8080\n").unwrap();

        with_env_vars(
            vec![("HOST", "0.0.0.0"), ("PORT", "9000"), ("ATLAS_DB", "/tmp/x.db")],
            || {
                let config = Config::load(&path).unwrap();
                assert_eq!(config.host(), "0.0.0.0");
                assert_eq!(config.port(), 9000);
                assert_eq!(config.database_path(), PathBuf::from("/tmp/x.db"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_port_env() {
        with_env_vars(vec![("PORT", "not-a-port")], || {
            let result = Config::default().resolve();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue { field: "server.port", .. })
            ));
        });
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_invalid_values() {
        without_env(&OVERRIDES, || {
            let mut zero_port = Config::default();
            zero_port.server.port = Some(0);
            assert!(zero_port.resolve().is_err());

            let mut empty_host = Config::default();
            empty_host.server.host = Some("  ".into());
            assert!(empty_host.resolve().is_err());

            let mut zero_page = Config::default();
            zero_page.pagination.default_page_size = Some(0);
            assert!(zero_page.resolve().is_err());

            let mut too_large = Config::default();
            too_large.pagination.default_page_size = Some(100);
            too_large.pagination.max_page_size = Some(10);
            assert!(matches!(
                too_large.resolve(),
                Err(ConfigError::InvalidValue {
                    field: "pagination.default_page_size",
                    ..
                })
            ));
        });
    }

    #[test]
    #[serial]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::TomlDeError(_))));
    }

    #[test]
    #[serial]
    fn test_annotated_document() {
        without_env(&OVERRIDES, || {
            let doc = Config::default_config().to_annotated_document().unwrap();
            let rendered = doc.to_string();

            assert!(rendered.contains("# HTTP server settings."));
            assert!(rendered.contains("# Default: 5001\nport = 5001"));
            assert!(rendered.contains("busy_timeout_ms = 5000"));

            let parsed: Config = toml::from_str(&rendered).unwrap();
            assert_eq!(parsed.max_page_size(), 1000);
        });
    }

    #[test]
    #[serial]
    fn test_generate_default_config() {
        without_env(&OVERRIDES, || {
            let dir = tempdir().unwrap();
            let path = dir.path().join("nested").join("atlas.toml");
            let previous = config_path();
            set_config_path(&path);

            let written = generate_default_config().unwrap();
            assert_eq!(written, path);
            assert!(path.exists());
            assert!(matches!(
                generate_default_config(),
                Err(ConfigError::ConfigAlreadyExists(_))
            ));

            set_config_path(previous);
        });
    }

    #[test]
    #[serial]
    fn test_save_and_reload() {
        without_env(&OVERRIDES, || {
            let dir = tempdir().unwrap();
            let path = dir.path().join("atlas.toml");
            let previous = config_path();
            set_config_path(&path);

            let mut config = Config::default_config();
            config.server.port = Some(7000);
            config.database.seed_on_start = Some(true);
            config.save().unwrap();

            let reloaded = Config::new().unwrap();
            assert_eq!(reloaded.port(), 7000);
            assert!(reloaded.seed_on_start());

            set_config_path(previous);
        });
    }

    fn with_env_vars<F: FnOnce()>(vars: Vec<(&str, &str)>, f: F) {
        without_env(&OVERRIDES, || crate::test_utils::with_env(vars, f));
    }
}
