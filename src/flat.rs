//! Flat, spreadsheet-friendly rows for translator review.
//!
//! A flat file has a header row followed by one row per translatable unit:
//! `table;index;english;translation`. Rows of a table's secondary entries
//! carry the table id with an `.entries2` suffix, since spreadsheet tools
//! have no notion of nested lists. Inside the crate that suffix is parsed
//! into a [`RowKey`] and only formatted again when writing the file.

use crate::error::FlatFileError;
use crate::table::EntryList;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Suffix marking rows that belong to secondary entries.
pub const SECONDARY_SUFFIX: &str = ".entries2";

/// Index value of a table's display-name row.
pub const NAME_INDEX: &str = "name";

/// Header columns, in file order.
pub const HEADER: [&str; 4] = ["table", "index", "english", "translation"];

/// Byte-order mark written before the first header field.
const BOM: char = '\u{feff}';

/// Default column delimiter.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Address of the entry list a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    /// Table identifier, without any suffix.
    pub table: String,
    /// Entry list the row's position refers to.
    pub list: EntryList,
}

impl RowKey {
    pub fn primary(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            list: EntryList::Primary,
        }
    }

    pub fn secondary(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            list: EntryList::Secondary,
        }
    }

    /// Parses the key column of a flat file.
    pub fn parse(value: &str) -> Self {
        match value.strip_suffix(SECONDARY_SUFFIX) {
            Some(table) => Self::secondary(table),
            None => Self::primary(value),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.list {
            EntryList::Primary => write!(f, "{}", self.table),
            EntryList::Secondary => write!(f, "{}{}", self.table, SECONDARY_SUFFIX),
        }
    }
}

/// What a row's index column points at.
///
/// `Name` sorts before every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowIndex {
    /// The table's display name.
    Name,
    /// A position in the entry list.
    Position(usize),
}

impl RowIndex {
    /// Parses the index column, returning `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        if value == NAME_INDEX {
            return Some(RowIndex::Name);
        }
        value.parse().ok().map(RowIndex::Position)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIndex::Name => f.write_str(NAME_INDEX),
            RowIndex::Position(position) => write!(f, "{}", position),
        }
    }
}

/// One translatable unit paired with its reference text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub key: RowKey,
    pub index: RowIndex,
    /// Text in the reference language.
    pub reference: String,
    /// Text in the target language.
    pub translation: String,
}

impl FlatRow {
    pub fn new(
        key: RowKey,
        index: RowIndex,
        reference: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            key,
            index,
            reference: reference.into(),
            translation: translation.into(),
        }
    }

    /// Sort key: table, then primary before secondary, then name before positions.
    pub fn sort_key(&self) -> (&str, EntryList, RowIndex) {
        (&self.key.table, self.key.list, self.index)
    }
}

/// Sorts rows so each table's rows are adjacent and in write order.
pub fn sort_rows(rows: &mut [FlatRow]) {
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Incremental writer for flat files.
pub struct FlatFileWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl FlatFileWriter<BufWriter<File>> {
    /// Creates (or truncates) a flat file and writes its header.
    pub fn create(path: &Path, delimiter: u8) -> Result<Self, FlatFileError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), delimiter)
    }
}

impl<W: Write> FlatFileWriter<W> {
    /// Wraps a writer and writes the header row.
    pub fn new(inner: W, delimiter: u8) -> Result<Self, FlatFileError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);

        let first = format!("{}{}", BOM, HEADER[0]);
        writer.write_record([first.as_str(), HEADER[1], HEADER[2], HEADER[3]])?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Appends one data row.
    pub fn write_row(&mut self, row: &FlatRow) -> Result<(), FlatFileError> {
        let key = row.key.to_string();
        let index = row.index.to_string();
        self.writer
            .write_record([&key, &index, &row.reference, &row.translation])?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes buffered rows and returns the inner writer.
    pub fn finish(mut self) -> Result<W, FlatFileError> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| FlatFileError::Io(e.into_error()))
    }
}

/// Reads every data row of a flat file.
pub fn read_flat_file(path: &Path, delimiter: u8) -> Result<Vec<FlatRow>, FlatFileError> {
    let content = std::fs::read_to_string(path)?;
    parse_flat_rows(&content, delimiter)
}

/// Parses flat file content; the header line is skipped and fields are trimmed.
pub fn parse_flat_rows(content: &str, delimiter: u8) -> Result<Vec<FlatRow>, FlatFileError> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < HEADER.len() {
            return Err(FlatFileError::MissingColumn { line });
        }

        let index = RowIndex::parse(&record[1]).ok_or_else(|| FlatFileError::InvalidIndex {
            line,
            value: record[1].to_string(),
        })?;

        rows.push(FlatRow::new(
            RowKey::parse(&record[0]),
            index,
            &record[2],
            &record[3],
        ));
    }

    Ok(rows)
}
