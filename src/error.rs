//! Error types for the meaning table pipeline.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for table store operations.
#[derive(Error, Debug)]
pub enum TableError {
    /// No table file exists for the identifier
    #[error("Table not found: {0}")]
    NotFound(String),

    /// Failed to read a table file or directory
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Table file is not valid table JSON
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write a table file
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's `id` field differs from its file name
    #[error("{} declares id {id:?}, which does not match its file name", path.display())]
    IdMismatch { path: PathBuf, id: String },

    /// Entry position beyond the end of the list
    #[error("Position {position} of {table} {list:?} entries is past the end ({len} entries)")]
    PositionOutOfRange {
        table: String,
        list: crate::table::EntryList,
        position: usize,
        len: usize,
    },

    /// Identifier cannot be used as a file name
    #[error("Invalid table identifier: {0:?}")]
    InvalidId(String),
}

/// Error type for reading and writing flat export files.
#[derive(Error, Debug)]
pub enum FlatFileError {
    /// Failed to open, read or write the file
    #[error("Flat file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimiter-separated content
    #[error("Flat file is malformed: {0}")]
    Csv(#[from] csv::Error),

    /// Index column is neither `name` nor a non-negative integer
    #[error("Invalid index {value:?} on line {line}")]
    InvalidIndex { line: u64, value: String },

    /// Row has fewer than the required columns
    #[error("Missing column on line {line}")]
    MissingColumn { line: u64 },
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for translation provider operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// HTTP request to API failed
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {0}")]
    ApiError(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Provider returned a different number of strings than requested
    #[error("Provider returned {actual} translations for {expected} strings")]
    LengthMismatch { expected: usize, actual: usize },

    /// All retry attempts exhausted
    #[error("All retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<TranslationError>,
    },

    /// Invalid API configuration
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),
}

/// Error type for export, import and translate runs.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A required command-line argument was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    FlatFile(#[from] FlatFileError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl SyncError {
    /// Returns true for a missing table identifier.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Table(TableError::NotFound(_)))
    }
}
