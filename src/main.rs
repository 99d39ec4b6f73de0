//! Meaning Tables CLI - export, import and machine-translate meaning tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meaning_tables::check::check;
use meaning_tables::config::{parse_delimiter, Config, API_KEY_ENV};
use meaning_tables::console::Console;
use meaning_tables::error::SyncError;
use meaning_tables::export::export_to_file;
use meaning_tables::import::import_file;
use meaning_tables::pipeline::{TranslationCache, TranslationPipeline};
use meaning_tables::table::TableStore;
use meaning_tables::translator::GoogleTranslator;
use std::path::PathBuf;
use std::process::ExitCode;

const EXPORT_USAGE: &str = "meaning-tables export <language> [<CSV delimiter>]";
const IMPORT_USAGE: &str = "meaning-tables import <language> [<CSV delimiter>]";
const TRANSLATE_USAGE: &str = "meaning-tables translate <language>";
const CHECK_USAGE: &str = "meaning-tables check <language>";

/// Maintains translated meaning tables.
#[derive(Parser, Debug)]
#[command(name = "meaning-tables")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the one in the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write reference and translated texts to meaning-tables_<language>.csv.
    Export {
        /// Target language code, e.g. `fr`.
        language: Option<String>,
        /// Column delimiter (defaults to the configured one).
        delimiter: Option<String>,
    },

    /// Merge an edited meaning-tables_<language>.csv back into the tables.
    Import {
        /// Target language code, e.g. `fr`.
        language: Option<String>,
        /// Column delimiter (defaults to the configured one).
        delimiter: Option<String>,
    },

    /// Machine-translate the reference tables into a new language.
    Translate {
        /// Target language code, e.g. `fr`.
        language: Option<String>,
    },

    /// Report structural differences between the reference and a translation.
    Check {
        /// Target language code, e.g. `fr`.
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let console = Console::new();
    let outcome = run(args, &console).await;
    finish(outcome, &console)
}

/// Reports the outcome of a run and picks the process exit code.
///
/// A missing argument prints the usage and still exits successfully; any
/// other error is printed with its causes and fails the process.
fn finish(outcome: Result<()>, console: &Console) -> ExitCode {
    let Err(e) = outcome else {
        return ExitCode::SUCCESS;
    };
    if let Some(SyncError::MissingArgument(usage)) = e.downcast_ref::<SyncError>() {
        console.warning(&format!("Missing arguments. Usage: {}", usage));
        return ExitCode::SUCCESS;
    }
    console.error(&format!("{:#}", e));
    ExitCode::FAILURE
}

async fn run(args: Args, console: &Console) -> Result<()> {
    let language = match &args.command {
        Command::Export { language, .. } => require_language(language, EXPORT_USAGE)?,
        Command::Import { language, .. } => require_language(language, IMPORT_USAGE)?,
        Command::Translate { language } => require_language(language, TRANSLATE_USAGE)?,
        Command::Check { language } => require_language(language, CHECK_USAGE)?,
    };

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.apply_env();
    config.validate().context("Invalid configuration")?;

    match args.command {
        Command::Export { delimiter, .. } => {
            let delimiter = resolve_delimiter(&config, delimiter.as_deref())?;
            export(&config, &language, delimiter, console)
        }
        Command::Import { delimiter, .. } => {
            let delimiter = resolve_delimiter(&config, delimiter.as_deref())?;
            import(&config, &language, delimiter, console)
        }
        Command::Translate { .. } => translate(&config, &language, console).await,
        Command::Check { .. } => report(&config, &language, console),
    }
}

fn require_language(language: &Option<String>, usage: &'static str) -> Result<String, SyncError> {
    language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .ok_or(SyncError::MissingArgument(usage))
}

fn resolve_delimiter(config: &Config, cli_value: Option<&str>) -> Result<u8> {
    let delimiter = match cli_value {
        Some(value) => parse_delimiter(value)?,
        None => config.delimiter()?,
    };
    Ok(delimiter)
}

fn export(config: &Config, language: &str, delimiter: u8, console: &Console) -> Result<()> {
    console.section(&format!("Exporting meaning tables ({})", language));

    let paths = &config.paths;
    let reference = TableStore::new(&paths.tables_root, &paths.reference_language)
        .load_collection()
        .context("Failed to load reference tables")?;
    let translated = TableStore::new(&paths.tables_root, language)
        .load_collection()
        .context("Failed to load translated tables")?;
    console.info(&format!(
        "Loaded {} reference and {} translated tables",
        console.count(reference.len()),
        console.count(translated.len())
    ));

    let output = paths.export_file(language);
    let summary = export_to_file(&reference, &translated, &output, delimiter, console)?;

    console.table_list("Not translated yet", &summary.untranslated);
    console.table_list("Missing from the translation", &summary.missing_translation);
    console.table_list("Failed to write", &summary.failed);
    console.success(&format!(
        "Wrote {} rows from {} tables to {}",
        console.count(summary.rows_written),
        console.count(summary.tables_exported),
        output.display()
    ));
    Ok(())
}

fn import(config: &Config, language: &str, delimiter: u8, console: &Console) -> Result<()> {
    console.section(&format!("Importing meaning tables ({})", language));

    let input = config.paths.export_file(language);
    let store = TableStore::new(&config.paths.tables_root, language);
    let summary = import_file(&input, delimiter, &store, console)
        .with_context(|| format!("Failed to import {}", input.display()))?;

    console.success(&format!(
        "Applied {} rows to {} tables",
        console.count(summary.rows_applied),
        console.count(summary.tables_updated.len())
    ));
    Ok(())
}

async fn translate(config: &Config, language: &str, console: &Console) -> Result<()> {
    console.section(&format!("Translating meaning tables ({})", language));

    if !config.api.is_configured() {
        console.warning(&format!(
            "API key not configured. Set {} or edit the config file.",
            API_KEY_ENV
        ));
        return Ok(());
    }
    config
        .validate_for_translation()
        .context("Invalid configuration")?;

    let paths = &config.paths;
    let reference = TableStore::new(&paths.tables_root, &paths.reference_language)
        .load_collection()
        .context("Failed to load reference tables")?;
    let target = TableStore::new(&paths.tables_root, language);

    let translator = GoogleTranslator::new(config.api.clone(), config.translation.clone());
    let mut pipeline = TranslationPipeline::new(&translator, &paths.reference_language, language);
    let mut cache = TranslationCache::new();

    let summary = pipeline
        .translate_collection(&reference, &target, &mut cache, console)
        .await?;

    console.success(&format!(
        "Translated {} tables ({} strings in {} requests, {} from cache)",
        console.count(summary.tables_translated),
        console.count(summary.strings_sent),
        console.count(summary.provider_calls),
        console.count(summary.cache_hits)
    ));
    Ok(())
}

fn report(config: &Config, language: &str, console: &Console) -> Result<()> {
    console.section(&format!("Checking meaning tables ({})", language));

    let paths = &config.paths;
    let reference = TableStore::new(&paths.tables_root, &paths.reference_language)
        .load_collection()
        .context("Failed to load reference tables")?;
    let translated = TableStore::new(&paths.tables_root, language)
        .load_collection()
        .context("Failed to load translated tables")?;

    let report = check(&reference, &translated);
    if report.is_clean() {
        console.success("Translation mirrors the reference tables");
        return Ok(());
    }

    console.table_list("Missing from the translation", &report.missing);
    console.table_list("Not in the reference", &report.orphaned);
    console.table_list("Not translated yet", &report.untranslated);
    for mismatch in &report.length_mismatches {
        console.length_mismatch(
            &mismatch.table,
            mismatch.list,
            mismatch.reference_len,
            mismatch.translated_len,
        );
    }
    Ok(())
}
