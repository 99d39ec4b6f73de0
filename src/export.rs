//! Export of reference/translated table pairs to a flat file.

use crate::console::Console;
use crate::error::SyncError;
use crate::flat::{FlatFileWriter, FlatRow, RowIndex, RowKey};
use crate::table::{Collection, EntryList, Table};
use std::path::Path;

/// Outcome of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Tables whose rows were written.
    pub tables_exported: usize,
    /// Data rows written, header excluded.
    pub rows_written: usize,
    /// Reference tables with no translated counterpart.
    pub missing_translation: Vec<String>,
    /// Translated tables with no entries yet.
    pub untranslated: Vec<String>,
    /// Tables whose rows could not be written.
    pub failed: Vec<String>,
}

/// Returns the translated counterpart of a reference table if it has anything to review.
fn counterpart<'a>(reference: &Table, translated: &'a Collection) -> Option<&'a Table> {
    translated
        .get(&reference.id)
        .filter(|table| !table.entries.is_empty())
}

/// Builds the rows of one table pair: name, primary entries, secondary entries.
///
/// Positions stop at the shorter of the two lists. Secondary rows are only
/// produced when both tables have secondary entries.
pub fn table_rows(reference: &Table, translated: &Table) -> Vec<FlatRow> {
    let mut rows = vec![FlatRow::new(
        RowKey::primary(&reference.id),
        RowIndex::Name,
        &reference.name,
        &translated.name,
    )];

    for list in [EntryList::Primary, EntryList::Secondary] {
        let (Some(reference_entries), Some(translated_entries)) =
            (reference.entry_list(list), translated.entry_list(list))
        else {
            continue;
        };

        let key = RowKey {
            table: reference.id.clone(),
            list,
        };
        rows.extend(
            reference_entries
                .iter()
                .zip(translated_entries)
                .enumerate()
                .map(|(position, (reference_text, translated_text))| {
                    FlatRow::new(
                        key.clone(),
                        RowIndex::Position(position),
                        reference_text,
                        translated_text,
                    )
                }),
        );
    }

    rows
}

/// Builds all rows of a collection pair, in table then row order.
///
/// Tables missing from either side are skipped, as are translated tables
/// without entries.
pub fn export_rows(reference: &Collection, translated: &Collection) -> Vec<FlatRow> {
    reference
        .tables()
        .filter_map(|table| counterpart(table, translated).map(|t| table_rows(table, t)))
        .flatten()
        .collect()
}

/// Writes the flat file for a collection pair, one table at a time.
///
/// A table whose rows fail to write is reported and skipped; the rest of
/// the export continues.
pub fn export_to_file(
    reference: &Collection,
    translated: &Collection,
    path: &Path,
    delimiter: u8,
    console: &Console,
) -> Result<ExportSummary, SyncError> {
    let mut writer = FlatFileWriter::create(path, delimiter)?;
    let mut summary = ExportSummary::default();

    for table in reference.tables() {
        let Some(translated_table) = translated.get(&table.id) else {
            summary.missing_translation.push(table.id.clone());
            continue;
        };
        if counterpart(table, translated).is_none() {
            summary.untranslated.push(table.id.clone());
            continue;
        }

        let rows = table_rows(table, translated_table);
        match rows.iter().try_for_each(|row| writer.write_row(row)) {
            Ok(()) => {
                summary.tables_exported += 1;
                console.info(&format!("Exported {} ({} rows)", table.id, rows.len()));
            }
            Err(e) => {
                console.warning(&format!("Failed to write rows of {}: {}", table.id, e));
                summary.failed.push(table.id.clone());
            }
        }
    }

    summary.rows_written = writer.rows_written();
    writer.finish()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::read_flat_file;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn collection(language: &str, tables: Vec<Table>) -> Collection {
        let mut collection = Collection::new(language);
        for table in tables {
            collection.insert(table);
        }
        collection
    }

    #[test]
    fn test_table_rows_order() {
        let mut reference = Table::new("t", "Name", strings(&["a", "b"]));
        reference.entries2 = Some(strings(&["c"]));
        let mut translated = Table::new("t", "Nom", strings(&["A", "B"]));
        translated.entries2 = Some(strings(&["C"]));

        let rows = table_rows(&reference, &translated);
        assert_eq!(
            rows,
            vec![
                FlatRow::new(RowKey::primary("t"), RowIndex::Name, "Name", "Nom"),
                FlatRow::new(RowKey::primary("t"), RowIndex::Position(0), "a", "A"),
                FlatRow::new(RowKey::primary("t"), RowIndex::Position(1), "b", "B"),
                FlatRow::new(RowKey::secondary("t"), RowIndex::Position(0), "c", "C"),
            ]
        );
    }

    #[test]
    fn test_shorter_translation_truncates_rows() {
        let reference = Table::new("t", "Name", strings(&["a", "b", "c"]));
        let translated = Table::new("t", "Nom", strings(&["A"]));

        let rows = table_rows(&reference, &translated);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].index, RowIndex::Position(0));
    }

    #[test]
    fn test_secondary_requires_both_sides() {
        let mut reference = Table::new("t", "Name", strings(&["a"]));
        reference.entries2 = Some(strings(&["b"]));
        let translated = Table::new("t", "Nom", strings(&["A"]));

        let rows = table_rows(&reference, &translated);
        assert!(rows.iter().all(|r| r.key.list == EntryList::Primary));
    }

    #[test]
    fn test_missing_and_untranslated_tables_skipped() {
        let reference = collection(
            "en",
            vec![
                Table::new("a", "A", strings(&["x"])),
                Table::new("b", "B", strings(&["y"])),
                Table::new("c", "C", strings(&["z"])),
            ],
        );
        let translated = collection(
            "fr",
            vec![
                Table::new("a", "A fr", strings(&["X"])),
                Table::new("b", "B fr", vec![]),
                Table::new("only_fr", "?", strings(&["?"])),
            ],
        );

        let rows = export_rows(&reference, &translated);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.key.table == "a"));
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("meaning-tables_fr.csv");
        let reference = collection(
            "en",
            vec![
                Table::new("a", "A", strings(&["x", "y"])),
                Table::new("b", "B", strings(&["z"])),
                Table::new("c", "C", strings(&["w"])),
            ],
        );
        let translated = collection(
            "fr",
            vec![
                Table::new("a", "A fr", strings(&["X", "Y"])),
                Table::new("c", "C fr", vec![]),
            ],
        );

        let summary = export_to_file(
            &reference,
            &translated,
            &path,
            b';',
            &Console::with_colors(false),
        )
        .unwrap();

        assert_eq!(summary.tables_exported, 1);
        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.missing_translation, vec!["b".to_string()]);
        assert_eq!(summary.untranslated, vec!["c".to_string()]);
        assert!(summary.failed.is_empty());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\u{feff}table;index;english;translation\n"));
        assert_eq!(read_flat_file(&path, b';').unwrap(), export_rows(&reference, &translated));
    }
}
