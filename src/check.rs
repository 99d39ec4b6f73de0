//! Consistency report between a reference collection and a translation.

use crate::table::{Collection, EntryList};

/// An entry list whose translated length differs from the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub table: String,
    pub list: EntryList,
    pub reference_len: usize,
    pub translated_len: usize,
}

/// Differences found between two collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Reference tables with no translated file.
    pub missing: Vec<String>,
    /// Translated tables with no reference file.
    pub orphaned: Vec<String>,
    /// Translated tables without primary entries.
    pub untranslated: Vec<String>,
    pub length_mismatches: Vec<LengthMismatch>,
}

impl CheckReport {
    /// Returns true if the translation mirrors the reference exactly.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.orphaned.is_empty()
            && self.untranslated.is_empty()
            && self.length_mismatches.is_empty()
    }
}

/// Compares the structure of `translated` against `reference`.
pub fn check(reference: &Collection, translated: &Collection) -> CheckReport {
    let mut report = CheckReport::default();

    for table in reference.tables() {
        let Some(translated_table) = translated.get(&table.id) else {
            report.missing.push(table.id.clone());
            continue;
        };
        if translated_table.entries.is_empty() {
            report.untranslated.push(table.id.clone());
            continue;
        }

        for list in [EntryList::Primary, EntryList::Secondary] {
            let reference_len = table.entry_list(list).map_or(0, <[String]>::len);
            let translated_len = translated_table.entry_list(list).map_or(0, <[String]>::len);
            if reference_len != translated_len {
                report.length_mismatches.push(LengthMismatch {
                    table: table.id.clone(),
                    list,
                    reference_len,
                    translated_len,
                });
            }
        }
    }

    report.orphaned = translated
        .tables()
        .filter(|t| !reference.contains(&t.id))
        .map(|t| t.id.clone())
        .collect();

    report
}
