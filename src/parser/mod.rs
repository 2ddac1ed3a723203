//! Reader layer: turns source files into tables

mod csv;
mod discover;
mod excel;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::discover::discover_files;
pub use self::excel::{ExcelParser, SheetTable, MAX_SHEETS};

/// Trait for reading a source file into tables
pub trait Parser: Send + Sync {
    /// Parse a file into its tables, in source order
    fn parse(&self, path: &Path) -> Result<Vec<Box<dyn Table>>>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for picking a parser by file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(ExcelParser), Box::new(CsvParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path) -> Result<Vec<Box<dyn Table>>> {
        self.get_parser(path)?.parse(path)
    }
}
