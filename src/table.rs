//! On-disk meaning tables.
//!
//! Each language has its own directory holding one `<id>.json` file per
//! table. Files are written with tab indentation and a fixed field order so
//! they diff cleanly under version control.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File extension of table files.
const TABLE_EXTENSION: &str = "json";

/// Which wording set of a table an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryList {
    /// The `entries` list.
    Primary,
    /// The `entries2` list.
    Secondary,
}

/// A single meaning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Identifier, identical across languages.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Primary entries.
    #[serde(default)]
    pub entries: Vec<String>,

    /// Alternate wording of the same meanings, if the table has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries2: Option<Vec<String>>,

    /// Fields this tool does not interpret, kept so rewrites don't drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Table {
    /// Creates a table without secondary entries.
    pub fn new(id: impl Into<String>, name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entries,
            entries2: None,
            extra: Map::new(),
        }
    }

    /// Returns the given entry list, if the table has it.
    pub fn entry_list(&self, list: EntryList) -> Option<&[String]> {
        match list {
            EntryList::Primary => Some(&self.entries),
            EntryList::Secondary => self.entries2.as_deref(),
        }
    }

    /// Overwrites one entry position, leaving every other position as is.
    ///
    /// A position equal to the list length appends. Anything further is
    /// rejected so a stray index can't grow the list. A secondary write on a
    /// table without `entries2` creates the list.
    pub fn set_entry(
        &mut self,
        list: EntryList,
        position: usize,
        value: String,
    ) -> Result<(), TableError> {
        let had_secondary = self.entries2.is_some();
        let entries = match list {
            EntryList::Primary => &mut self.entries,
            EntryList::Secondary => self.entries2.get_or_insert_with(Vec::new),
        };

        let len = entries.len();
        match position.cmp(&len) {
            std::cmp::Ordering::Less => entries[position] = value,
            std::cmp::Ordering::Equal => entries.push(value),
            std::cmp::Ordering::Greater => {
                if !had_secondary {
                    self.entries2 = None;
                }
                return Err(TableError::PositionOutOfRange {
                    table: self.id.clone(),
                    list,
                    position,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Serializes the table in its on-disk form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        let mut json = String::from_utf8_lossy(&buffer).into_owned();
        json.push('\n');
        Ok(json)
    }
}

/// All tables of one language, ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Language code, e.g. `en`.
    pub language: String,
    tables: BTreeMap<String, Table>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.id.clone(), table);
    }

    /// Looks up a table by identifier.
    pub fn get(&self, id: &str) -> Option<&Table> {
        self.tables.get(id)
    }

    /// Returns true if a table with this identifier exists.
    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// Iterates tables in identifier order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Table files of a single language directory.
#[derive(Debug, Clone)]
pub struct TableStore {
    language: String,
    directory: PathBuf,
}

impl TableStore {
    /// Creates a store for `<tables_root>/<language>`.
    pub fn new(tables_root: &Path, language: &str) -> Self {
        Self {
            language: language.to_string(),
            directory: tables_root.join(language),
        }
    }

    /// Language served by this store.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Directory holding the table files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file for a table identifier.
    pub fn table_path(&self, id: &str) -> Result<PathBuf, TableError> {
        validate_id(id)?;
        Ok(self
            .directory
            .join(format!("{}.{}", id, TABLE_EXTENSION)))
    }

    /// Loads every `*.json` table in the directory.
    pub fn load_collection(&self) -> Result<Collection, TableError> {
        let read_error = |source| TableError::Read {
            path: self.directory.clone(),
            source,
        };

        let mut collection = Collection::new(&self.language);
        for dir_entry in std::fs::read_dir(&self.directory).map_err(read_error)? {
            let path = dir_entry.map_err(read_error)?.path();
            let is_table = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(TABLE_EXTENSION);
            if !is_table {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                collection.insert(read_table(&path, stem)?);
            }
        }

        Ok(collection)
    }

    /// Loads a single table by identifier.
    pub fn load_table(&self, id: &str) -> Result<Table, TableError> {
        let path = self.table_path(id)?;
        if !path.is_file() {
            return Err(TableError::NotFound(id.to_string()));
        }
        read_table(&path, id)
    }

    /// Writes a table, creating the language directory if needed.
    pub fn save_table(&self, table: &Table) -> Result<PathBuf, TableError> {
        let path = self.table_path(&table.id)?;
        let write_error = |source| TableError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.directory).map_err(write_error)?;

        let json = table.to_json().map_err(|source| TableError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(write_error)?;

        Ok(path)
    }
}

/// Reads a table file whose `id` field must match its file name.
fn read_table(path: &Path, expected_id: &str) -> Result<Table, TableError> {
    let content = std::fs::read_to_string(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let table: Table = serde_json::from_str(&content).map_err(|source| TableError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if table.id != expected_id {
        return Err(TableError::IdMismatch {
            path: path.to_path_buf(),
            id: table.id,
        });
    }
    Ok(table)
}

/// Rejects identifiers that would escape the language directory.
fn validate_id(id: &str) -> Result<(), TableError> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control);

    if invalid {
        return Err(TableError::InvalidId(id.to_string()));
    }
    Ok(())
}
