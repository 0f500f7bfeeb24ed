//! Error types for axal

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using axal's Error
pub type Result<T> = std::result::Result<T, Error>;

/// axal error types
///
/// The first three variants are fatal for a whole run. `FileRead`, `Parse`
/// and `FileWrite` only ever concern a single file; the driver reports them
/// and moves on to the next one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No .{extension} files found in {path}")]
    NoSourceFiles { path: PathBuf, extension: String },

    #[error("Cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path} at {line}:{column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Cannot write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Language error: {message}")]
    Language { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error only affects one file of a batch
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. } | Error::Parse { .. } | Error::FileWrite { .. }
        )
    }
}
