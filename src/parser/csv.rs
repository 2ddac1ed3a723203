//! CSV file parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{MemTable, Table};

use super::Parser;

/// Parser for CSV files.
///
/// A file is a single table named by its file stem. Every line, including
/// the group, name and tag rows, is read as data; header interpretation is
/// left to the exporter.
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Vec<Box<dyn Table>>> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let mut table = MemTable::new(name, Vec::new());

        for (line_num, result) in csv_reader.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to read CSV row {}", line_num + 1))?;
            table.push_row(record.iter().map(str::to_string).collect());
        }

        Ok(vec![Box::new(table)])
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("csv")
    }
}
