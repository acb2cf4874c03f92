//! Error types for the atlas binary.

use atlas_config::error::ConfigError;
use atlas_db::DbError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AtlasError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error("Error while {action}")]
    #[diagnostic(code(atlas::io), help("Check file permissions and that the path exists"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON input: {0}")]
    #[diagnostic(
        code(atlas::json),
        help("Expected an array of camelCase country objects")
    )]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(atlas::toml))]
    TomlError(#[from] toml::ser::Error),

    #[error("{0}")]
    #[diagnostic(code(atlas::custom))]
    Custom(String),
}

pub type AtlasResult<T> = std::result::Result<T, AtlasError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> AtlasResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> AtlasResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| AtlasError::IoError {
            action: context(),
            source: err,
        })
    }
}
