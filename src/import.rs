//! Import of edited flat files back into translated tables.
//!
//! Rows are sorted so each table's rows are adjacent, then applied one table
//! at a time: load the table from disk, overwrite the positions present in
//! the file, write it back. A failure part way through leaves the tables
//! already written updated and the rest untouched.

use crate::console::Console;
use crate::error::{SyncError, TableError};
use crate::flat::{read_flat_file, sort_rows, FlatRow, RowIndex};
use crate::table::{Table, TableStore};
use std::path::Path;

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Tables written back, in processing order.
    pub tables_updated: Vec<String>,
    /// Rows applied across all tables.
    pub rows_applied: usize,
}

/// Importer cursor over the sorted rows.
enum ImportState {
    NoTableOpen,
    TableOpen(Table),
}

/// Applies one row to the open table.
fn apply_row(table: &mut Table, row: FlatRow) -> Result<(), TableError> {
    match row.index {
        RowIndex::Name => table.name = row.translation,
        RowIndex::Position(position) => {
            table.set_entry(row.key.list, position, row.translation)?
        }
    }
    Ok(())
}

fn flush(
    store: &TableStore,
    table: Table,
    summary: &mut ImportSummary,
    console: &Console,
) -> Result<(), SyncError> {
    store.save_table(&table)?;
    console.info(&format!("Updated {}", table.id));
    summary.tables_updated.push(table.id);
    Ok(())
}

/// Merges rows into the tables of `store`.
///
/// Rows may arrive in any order. A row naming a table with no file aborts
/// the run with `TableError::NotFound`; a position more than one past the
/// end of its list aborts it with `TableError::PositionOutOfRange` before
/// that table is written.
pub fn import_rows(
    mut rows: Vec<FlatRow>,
    store: &TableStore,
    console: &Console,
) -> Result<ImportSummary, SyncError> {
    sort_rows(&mut rows);

    let mut summary = ImportSummary::default();
    let mut state = ImportState::NoTableOpen;

    for row in rows {
        let mut table = match state {
            ImportState::TableOpen(table) if table.id == row.key.table => table,
            ImportState::TableOpen(table) => {
                flush(store, table, &mut summary, console)?;
                store.load_table(&row.key.table)?
            }
            ImportState::NoTableOpen => store.load_table(&row.key.table)?,
        };

        apply_row(&mut table, row)?;
        summary.rows_applied += 1;
        state = ImportState::TableOpen(table);
    }

    if let ImportState::TableOpen(table) = state {
        flush(store, table, &mut summary, console)?;
    }

    Ok(summary)
}

/// Reads a flat file and merges it into the tables of `store`.
pub fn import_file(
    path: &Path,
    delimiter: u8,
    store: &TableStore,
    console: &Console,
) -> Result<ImportSummary, SyncError> {
    let rows = read_flat_file(path, delimiter)?;
    console.info(&format!("Read {} rows from {}", rows.len(), path.display()));
    import_rows(rows, store, console)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_to_file;
    use crate::flat::{parse_flat_rows, RowKey};
    use crate::table::EntryList;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn quiet() -> Console {
        Console::with_colors(false)
    }

    fn row(key: RowKey, index: RowIndex, translation: &str) -> FlatRow {
        FlatRow::new(key, index, "", translation)
    }

    #[test]
    fn test_unsorted_rows_applied_per_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "es");
        store
            .save_table(&Table::new("t1", "name", strings(&["c", "b"])))
            .unwrap();
        store
            .save_table(&Table::new("t2", "other", strings(&["a"])))
            .unwrap();

        let rows = vec![
            FlatRow::new(RowKey::primary("t2"), RowIndex::Position(0), "a", "A"),
            FlatRow::new(RowKey::primary("t1"), RowIndex::Name, "N", "Ñ"),
            FlatRow::new(RowKey::primary("t1"), RowIndex::Position(1), "b", "B"),
            FlatRow::new(RowKey::primary("t1"), RowIndex::Position(0), "c", "C"),
        ];
        let summary = import_rows(rows, &store, &quiet()).unwrap();

        assert_eq!(summary.tables_updated, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(summary.rows_applied, 4);

        let t1 = store.load_table("t1").unwrap();
        assert_eq!(t1.name, "Ñ");
        assert_eq!(t1.entries, strings(&["C", "B"]));
        assert_eq!(store.load_table("t2").unwrap().entries, strings(&["A"]));
    }

    #[test]
    fn test_partial_edit_preserves_other_positions() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        let mut original = Table::new("t", "Nom", strings(&["un", "deux", "trois"]));
        original.entries2 = Some(strings(&["uno", "dos"]));
        store.save_table(&original).unwrap();

        let rows = vec![
            row(RowKey::primary("t"), RowIndex::Position(1), "DEUX"),
            row(RowKey::secondary("t"), RowIndex::Position(0), "UNO"),
        ];
        import_rows(rows, &store, &quiet()).unwrap();

        let table = store.load_table("t").unwrap();
        assert_eq!(table.name, "Nom");
        assert_eq!(table.entries, strings(&["un", "DEUX", "trois"]));
        assert_eq!(table.entries2, Some(strings(&["UNO", "dos"])));
    }

    #[test]
    fn test_missing_table_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        store
            .save_table(&Table::new("a", "A", strings(&["x"])))
            .unwrap();

        let rows = vec![
            row(RowKey::primary("a"), RowIndex::Position(0), "X"),
            row(RowKey::primary("ghost"), RowIndex::Position(0), "G"),
        ];
        let err = import_rows(rows, &store, &quiet()).unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, SyncError::Table(TableError::NotFound(id)) if id == "ghost"));
        assert!(!store.directory().join("ghost.json").exists());
        // The table before the failure was already written.
        assert_eq!(store.load_table("a").unwrap().entries, strings(&["X"]));
    }

    #[test]
    fn test_out_of_range_position_aborts_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        store
            .save_table(&Table::new("a", "A", strings(&["x"])))
            .unwrap();
        store
            .save_table(&Table::new("t", "T", strings(&["un"])))
            .unwrap();
        let before = std::fs::read_to_string(store.directory().join("t.json")).unwrap();

        let content = "table;index;english;translation\n\
                       a;0;x;X\n\
                       t;0;one;UN\n\
                       t;18446744073709551615;a;X\n";
        let rows = parse_flat_rows(content, b';').unwrap();
        let err = import_rows(rows, &store, &quiet()).unwrap_err();

        assert!(matches!(
            err,
            SyncError::Table(TableError::PositionOutOfRange {
                ref table,
                list: EntryList::Primary,
                position: usize::MAX,
                len: 1,
            }) if table == "t"
        ));
        assert_eq!(store.load_table("a").unwrap().entries, strings(&["X"]));
        assert_eq!(
            std::fs::read_to_string(store.directory().join("t.json")).unwrap(),
            before
        );
    }

    #[test]
    fn test_mismatched_id_aborts_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        store
            .save_table(&Table::new("feelings", "Feelings", strings(&["calme"])))
            .unwrap();
        std::fs::rename(
            store.directory().join("feelings.json"),
            store.directory().join("moods.json"),
        )
        .unwrap();

        let err = import_rows(
            vec![row(RowKey::primary("moods"), RowIndex::Position(0), "CALME")],
            &store,
            &quiet(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Table(TableError::IdMismatch { ref id, .. }) if id == "feelings"
        ));
        assert!(!store.directory().join("feelings.json").exists());
        let raw = std::fs::read_to_string(store.directory().join("moods.json")).unwrap();
        assert!(raw.contains("\"calme\""));
    }

    #[test]
    fn test_position_at_end_appends() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        store
            .save_table(&Table::new("t", "T", strings(&["un"])))
            .unwrap();

        import_rows(
            vec![
                row(RowKey::primary("t"), RowIndex::Position(1), "deux"),
                row(RowKey::secondary("t"), RowIndex::Position(0), "uno"),
            ],
            &store,
            &quiet(),
        )
        .unwrap();

        let table = store.load_table("t").unwrap();
        assert_eq!(table.entries, strings(&["un", "deux"]));
        assert_eq!(table.entries2, Some(strings(&["uno"])));
    }

    #[test]
    fn test_last_table_is_flushed() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        store
            .save_table(&Table::new("only", "Only", strings(&["x"])))
            .unwrap();

        import_rows(
            vec![row(RowKey::primary("only"), RowIndex::Name, "Seul")],
            &store,
            &quiet(),
        )
        .unwrap();

        assert_eq!(store.load_table("only").unwrap().name, "Seul");
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = TableStore::new(temp_dir.path(), "fr");
        let summary = import_rows(Vec::new(), &store, &quiet()).unwrap();
        assert_eq!(summary, ImportSummary::default());
        assert!(!store.directory().exists());
    }

    #[test]
    fn test_export_then_import_is_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let reference_store = TableStore::new(temp_dir.path(), "en");
        let translated_store = TableStore::new(temp_dir.path(), "fr");

        let mut reference = Table::new("actions", "Actions", strings(&["Attack", "Flee"]));
        reference.entries2 = Some(strings(&["Strike", "Run; fast"]));
        let mut translated = Table::new("actions", "Actions", strings(&["Attaquer", "Fuir"]));
        translated.entries2 = Some(strings(&["Frapper", "Courir; vite"]));
        reference_store.save_table(&reference).unwrap();
        translated_store.save_table(&translated).unwrap();
        reference_store
            .save_table(&Table::new("moods", "Moods", strings(&["Calm", "Angry"])))
            .unwrap();
        translated_store
            .save_table(&Table::new("moods", "Humeurs", strings(&["Calme"])))
            .unwrap();

        let path = translated_store.directory().join("actions.json");
        let before = std::fs::read_to_string(&path).unwrap();
        let moods_path = translated_store.directory().join("moods.json");
        let moods_before = std::fs::read_to_string(&moods_path).unwrap();

        let csv_path = temp_dir.path().join("meaning-tables_fr.csv");
        export_to_file(
            &reference_store.load_collection().unwrap(),
            &translated_store.load_collection().unwrap(),
            &csv_path,
            b';',
            &quiet(),
        )
        .unwrap();
        import_file(&csv_path, b';', &translated_store, &quiet()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(std::fs::read_to_string(&moods_path).unwrap(), moods_before);
    }
}
