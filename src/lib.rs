//! Meaning Tables - translation pipeline for meaning table collections.
//!
//! This library provides functionality for:
//! - Loading and saving per-language collections of meaning tables
//! - Exporting reference/translated table pairs to a flat file for review
//! - Importing edited flat files back into translated tables
//! - Machine-translating a reference collection into a new language

pub mod check;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod flat;
pub mod import;
pub mod pipeline;
pub mod table;
pub mod translator;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use error::{ConfigError, FlatFileError, SyncError, TableError, TranslationError};
pub use flat::{FlatRow, RowIndex, RowKey};
pub use pipeline::{TranslationCache, TranslationPipeline};
pub use table::{Collection, EntryList, Table, TableStore};
pub use translator::{GoogleTranslator, Translator};
