//! Export engine: header scan, row walk and coercion shared by all encoders

pub mod coerce;
mod header;
mod rows;

use serde::Serialize;

use crate::error::Result;
use crate::model::{FieldSpec, Table, TableTarget, TypedValue};
use crate::output::TableEncoder;
use crate::progress::ProgressReporter;

pub use coerce::coerce;
pub use header::{scan_header, Header};
pub use rows::{RowWalker, FIRST_DATA_ROW, MAX_DATA_ROWS};

/// Name of the field that triggers id indexing in JSON output
pub const ID_FIELD: &str = "Id";

/// One field's raw cell within a record
#[derive(Debug, Clone)]
pub struct Cell<'f> {
    pub field: &'f FieldSpec,
    pub raw: String,
}

impl Cell<'_> {
    /// Coerced value of the cell
    pub fn value(&self) -> TypedValue {
        coerce(self.field.kind, &self.raw)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// One data row's cells, in header order
#[derive(Debug, Clone)]
pub struct Record<'f> {
    /// Zero-based source row
    pub row: usize,
    pub cells: Vec<Cell<'f>>,
}

impl<'f> Record<'f> {
    /// Read a row's cells for the given fields; missing cells read as empty
    pub fn read(table: &dyn Table, row: usize, fields: &'f [FieldSpec]) -> Self {
        let cells = fields
            .iter()
            .map(|field| Cell {
                field,
                raw: table
                    .cell(row, field.source_column)
                    .map(|c| c.into_owned())
                    .unwrap_or_default(),
            })
            .collect();
        Self { row, cells }
    }

    /// Cell of the top-level field with the given name
    pub fn top_level(&self, name: &str) -> Option<&Cell<'f>> {
        self.cells
            .iter()
            .find(|c| !c.field.is_grouped() && c.field.name == name)
    }
}

/// Outcome of exporting one table
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Raw table name
    pub table: String,
    /// Output key after prefix handling
    pub key: String,
    pub mode: String,
    pub fields: usize,
    pub rows: usize,
}

/// Drives tables through an encoder
pub struct Exporter<'p> {
    progress: &'p dyn ProgressReporter,
}

impl<'p> Exporter<'p> {
    pub fn new(progress: &'p dyn ProgressReporter) -> Self {
        Self { progress }
    }

    /// Export one table.
    ///
    /// Returns `Ok(None)` for tables skipped by the `#` naming convention.
    pub fn export(
        &self,
        table: &dyn Table,
        encoder: &mut dyn TableEncoder,
    ) -> Result<Option<TableSummary>> {
        let Some(target) = TableTarget::classify(table.name()) else {
            self.progress.table_skipped(table.name());
            return Ok(None);
        };
        self.progress.table_started(table.name());

        let header = scan_header(table);
        let rows = match self.encode(table, &target, &header, encoder) {
            Ok(rows) => rows,
            Err(e) => {
                encoder.abort();
                self.progress.table_failed(table.name(), &e);
                return Err(e);
            }
        };

        self.progress.table_finished(&target.key, rows);
        Ok(Some(TableSummary {
            table: table.name().to_string(),
            key: target.key,
            mode: target.mode.to_string(),
            fields: header.fields.len(),
            rows,
        }))
    }

    fn encode(
        &self,
        table: &dyn Table,
        target: &TableTarget,
        header: &Header,
        encoder: &mut dyn TableEncoder,
    ) -> Result<usize> {
        encoder.begin(target, &header.fields)?;

        let mut rows = 0;
        for row in RowWalker::new(table, header.check_column) {
            let record = Record::read(table, row, &header.fields);
            encoder.record(&record)?;
            rows += 1;
        }

        encoder.finish(rows)?;
        Ok(rows)
    }
}
