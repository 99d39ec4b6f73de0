//! Labeled terminal output for the export, import, translate and check runs.
//!
//! Progress goes to stdout, fatal errors to stderr. Colors are used only on
//! a terminal and never when `NO_COLOR` is set.

use crate::table::EntryList;
use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "1";
const HEADING: &str = "1;35";
const ID: &str = "2;90";

/// Kind of a console line; decides its label and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Step,
    Success,
    Warning,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Step => "STEP",
            Level::Success => "OK",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Info => "1;34",
            Level::Step => "1;36",
            Level::Success => "1;32",
            Level::Warning => "1;33",
            Level::Error => "1;31",
        }
    }
}

/// Console output handler.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a console that colors output only on an interactive stdout.
    pub fn new() -> Self {
        let colors_enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { colors_enabled }
    }

    /// Creates a console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colors_enabled {
            format!("\x1b[{}m{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Formats one labeled line, e.g. `[WARN] message`.
    pub fn line(&self, level: Level, message: &str) -> String {
        format!("[{}] {}", self.paint(level.label(), level.color()), message)
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.line(Level::Info, message));
    }

    /// Announces work on one table.
    pub fn step(&self, message: &str) {
        println!("{}", self.line(Level::Step, message));
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.line(Level::Success, message));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.line(Level::Warning, message));
    }

    /// Prints to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.line(Level::Error, message));
    }

    /// Prints the heading that opens a run, e.g. `Exporting meaning tables (fr)`.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.paint(message, HEADING));
    }

    /// Formats a number for a summary line.
    pub fn count(&self, n: usize) -> String {
        self.paint(&n.to_string(), BOLD)
    }

    /// Formats the warning and the indented identifiers of a table list.
    ///
    /// Returns no lines for an empty list.
    pub fn table_list_lines(&self, heading: &str, ids: &[String]) -> Vec<String> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(ids.len() + 1);
        lines.push(self.line(Level::Warning, &format!("{} ({}):", heading, ids.len())));
        lines.extend(ids.iter().map(|id| format!("    {}", self.paint(id, ID))));
        lines
    }

    /// Prints table identifiers under a heading, if there are any.
    pub fn table_list(&self, heading: &str, ids: &[String]) {
        for line in self.table_list_lines(heading, ids) {
            println!("{}", line);
        }
    }

    /// Warns that a table's list lengths differ between the two languages.
    pub fn length_mismatch(&self, table: &str, list: EntryList, reference: usize, translated: usize) {
        let list = match list {
            EntryList::Primary => "entries",
            EntryList::Secondary => "entries2",
        };
        self.warning(&format!(
            "{}.{}: {} in reference, {} translated",
            table, list, reference, translated
        ));
    }
}
