//! Machine translation of a reference collection into a target language.
//!
//! Each table is translated with one request list (name followed by the
//! primary entries) and, if present, a second list for the secondary
//! entries. A run-scoped [`TranslationCache`] keeps strings repeated across
//! tables from being sent to the provider more than once.

use crate::console::Console;
use crate::error::{SyncError, TranslationError};
use crate::table::{Collection, Table, TableStore};
use crate::translator::Translator;
use serde_json::Map;
use std::collections::{HashMap, HashSet};

/// Source string to translated string, for a single run.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
    hits: usize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    /// Records a translation; a later identical source string reuses it.
    pub fn insert(&mut self, source: String, translation: String) {
        self.entries.insert(source, translation);
    }

    /// Number of strings answered without a provider request.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a translate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateSummary {
    pub tables_translated: usize,
    /// Strings sent to the provider.
    pub strings_sent: usize,
    /// Strings answered by the cache.
    pub cache_hits: usize,
    /// Provider calls made.
    pub provider_calls: usize,
}

/// Translates reference tables and writes them to a target store.
pub struct TranslationPipeline<'a> {
    translator: &'a dyn Translator,
    source_language: String,
    target_language: String,
    provider_calls: usize,
    strings_sent: usize,
}

impl<'a> TranslationPipeline<'a> {
    pub fn new(translator: &'a dyn Translator, source_language: &str, target_language: &str) -> Self {
        Self {
            translator,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            provider_calls: 0,
            strings_sent: 0,
        }
    }

    /// Translates `texts`, asking the provider only for strings not yet cached.
    ///
    /// Misses are deduplicated and sent in batches no larger than the
    /// translator's limit. Blank strings are passed through untouched.
    pub async fn translate_strings(
        &mut self,
        texts: &[String],
        cache: &mut TranslationCache,
    ) -> Result<Vec<String>, TranslationError> {
        let mut seen = HashSet::new();
        let pending: Vec<String> = texts
            .iter()
            .filter(|text| !text.trim().is_empty() && cache.get(text).is_none())
            .filter(|text| seen.insert(text.as_str()))
            .cloned()
            .collect();

        let blank = texts.iter().filter(|t| t.trim().is_empty()).count();
        cache.hits += texts.len() - blank - pending.len();

        for batch in pending.chunks(self.translator.max_batch_size().max(1)) {
            let translations = self
                .translator
                .translate_batch(batch, &self.source_language, &self.target_language)
                .await?;
            self.provider_calls += 1;
            self.strings_sent += batch.len();

            if translations.len() != batch.len() {
                return Err(TranslationError::LengthMismatch {
                    expected: batch.len(),
                    actual: translations.len(),
                });
            }
            for (source, translation) in batch.iter().zip(translations) {
                cache.insert(source.clone(), translation);
            }
        }

        texts
            .iter()
            .map(|text| {
                if text.trim().is_empty() {
                    return Ok(text.clone());
                }
                cache.get(text).map(str::to_string).ok_or_else(|| {
                    TranslationError::ParseError(format!("no translation returned for {:?}", text))
                })
            })
            .collect()
    }

    /// Translates one table. The result keeps the reference identifier.
    pub async fn translate_table(
        &mut self,
        table: &Table,
        cache: &mut TranslationCache,
    ) -> Result<Table, TranslationError> {
        let mut request = Vec::with_capacity(table.entries.len() + 1);
        request.push(table.name.clone());
        request.extend(table.entries.iter().cloned());

        let mut translations = self.translate_strings(&request, cache).await?;
        let entries = translations.split_off(1);
        let name = translations.pop().unwrap_or_default();

        let entries2 = match &table.entries2 {
            Some(entries2) => Some(self.translate_strings(entries2, cache).await?),
            None => None,
        };

        Ok(Table {
            id: table.id.clone(),
            name,
            entries,
            entries2,
            extra: Map::new(),
        })
    }

    /// Translates every table of `reference` and saves each result to `target`
    /// before moving on. The first provider failure aborts the run.
    pub async fn translate_collection(
        &mut self,
        reference: &Collection,
        target: &TableStore,
        cache: &mut TranslationCache,
        console: &Console,
    ) -> Result<TranslateSummary, SyncError> {
        let mut summary = TranslateSummary::default();

        for table in reference.tables() {
            console.step(&format!("Translating {}...", table.id));
            let translated = self.translate_table(table, cache).await?;
            let path = target.save_table(&translated)?;
            console.success(&format!("Wrote {}", path.display()));
            summary.tables_translated += 1;
        }

        summary.strings_sent = self.strings_sent;
        summary.provider_calls = self.provider_calls;
        summary.cache_hits = cache.hits();
        Ok(summary)
    }
}
