//! Table input contract and the table-naming convention

use std::borrow::Cow;

/// A named grid of cells supplied by a reader.
///
/// Rows 1–3 carry the group, name and type-tag header rows; data starts at
/// row 4. Row 0 is unused. `cell` returns `None` outside the table bounds,
/// which callers treat as end-of-data.
pub trait Table {
    /// Sheet or table identifier, including any `#`/`~` prefix
    fn name(&self) -> &str;

    /// Stringified cell at a zero-based position
    fn cell(&self, row: usize, col: usize) -> Option<Cow<'_, str>>;

    /// Number of columns the table declares
    fn column_count(&self) -> usize;

    /// Number of rows the table declares
    fn row_count(&self) -> usize;
}

/// In-memory table of string cells.
///
/// Short rows are padded with empty cells up to the widest row.
#[derive(Debug, Clone, Default)]
pub struct MemTable {
    name: String,
    rows: Vec<Vec<String>>,
    columns: usize,
}

impl MemTable {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            columns,
        }
    }

    /// Build from borrowed rows, mostly for fixtures
    pub fn from_strs(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        Self::new(name, rows)
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.columns = self.columns.max(row.len());
        self.rows.push(row);
    }
}

impl Table for MemTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, row: usize, col: usize) -> Option<Cow<'_, str>> {
        if col >= self.columns {
            return None;
        }
        let row = self.rows.get(row)?;
        Some(Cow::Borrowed(row.get(col).map(String::as_str).unwrap_or("")))
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Whether a table exports as a list of records or as one aggregate record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Array,
    Object,
}

impl std::fmt::Display for TableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableMode::Array => write!(f, "array"),
            TableMode::Object => write!(f, "object"),
        }
    }
}

/// Export target derived from a table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    /// Output key / file stem, with any `~` prefix stripped
    pub key: String,
    pub mode: TableMode,
}

impl TableTarget {
    /// Classify a raw table name.
    ///
    /// `#name` is skipped (`None`), `~name` exports in object mode under
    /// `name`, anything else exports in array mode.
    pub fn classify(name: &str) -> Option<Self> {
        if name.starts_with('#') {
            return None;
        }
        let target = match name.strip_prefix('~') {
            Some(stripped) => Self {
                key: stripped.to_string(),
                mode: TableMode::Object,
            },
            None => Self {
                key: name.to_string(),
                mode: TableMode::Array,
            },
        };
        Some(target)
    }
}
