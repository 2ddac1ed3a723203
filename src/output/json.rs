//! JSON output format

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::{Record, ID_FIELD};
use crate::error::{ExportError, Result};
use crate::model::{FieldSpec, TableMode, TableTarget};

use super::{artifact_path, TableEncoder};

/// Key of the ordered record list in an array-mode container
pub const ITEMS_KEY: &str = "Items";

enum Sink<'r> {
    /// One `<key>.json` file per table
    Standalone(PathBuf),
    /// Insert each table under its key in a caller-owned root object
    Merge(&'r mut Map<String, Value>),
}

struct JsonTable {
    target: TableTarget,
    container: Map<String, Value>,
}

/// JSON encoder.
///
/// Array-mode tables become an object holding the records in order under
/// `Items`; a record with a non-empty top-level `Id` is additionally stored
/// under its id text. Object-mode tables become a single object that every
/// row writes into, so a field set by several rows keeps the last row's
/// value, matching XML object mode.
pub struct JsonEncoder<'r> {
    sink: Sink<'r>,
    table: Option<JsonTable>,
}

impl JsonEncoder<'static> {
    /// Write each table to its own file in `out_dir`
    pub fn standalone(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            sink: Sink::Standalone(out_dir.into()),
            table: None,
        }
    }
}

impl<'r> JsonEncoder<'r> {
    /// Merge each table into `root`
    pub fn merged(root: &'r mut Map<String, Value>) -> Self {
        Self {
            sink: Sink::Merge(root),
            table: None,
        }
    }
}

fn build_record(record: &Record<'_>) -> Map<String, Value> {
    let mut object = Map::new();
    write_fields(&mut object, record);
    object
}

fn write_fields(object: &mut Map<String, Value>, record: &Record<'_>) {
    for cell in record.cells.iter().filter(|c| !c.is_empty()) {
        // Grouped fields stay flat and keep their cell text.
        let value = if cell.field.is_grouped() {
            Value::String(cell.raw.clone())
        } else {
            cell.value().to_json()
        };
        object.insert(cell.field.name.clone(), value);
    }
}

impl TableEncoder for JsonEncoder<'_> {
    fn begin(&mut self, target: &TableTarget, _fields: &[FieldSpec]) -> Result<()> {
        let mut container = Map::new();
        if target.mode == TableMode::Array {
            container.insert(ITEMS_KEY.to_string(), Value::Array(Vec::new()));
        }
        self.table = Some(JsonTable {
            target: target.clone(),
            container,
        });
        Ok(())
    }

    fn record(&mut self, record: &Record<'_>) -> Result<()> {
        let table = self.table.as_mut().ok_or(ExportError::NoActiveTable)?;

        if table.target.mode == TableMode::Object {
            write_fields(&mut table.container, record);
            return Ok(());
        }

        let object = Value::Object(build_record(record));
        if let Some(id) = record.top_level(ID_FIELD).filter(|c| !c.is_empty()) {
            if id.raw == ITEMS_KEY {
                warn!(table = %table.target.key, row = record.row, "record id collides with the item list key, not indexed");
            } else {
                table.container.insert(id.raw.clone(), object.clone());
            }
        }
        if let Some(Value::Array(items)) = table.container.get_mut(ITEMS_KEY) {
            items.push(object);
        }
        Ok(())
    }

    fn finish(&mut self, _rows: usize) -> Result<()> {
        let table = self.table.take().ok_or(ExportError::NoActiveTable)?;
        let key = table.target.key;
        let document = Value::Object(table.container);

        match &mut self.sink {
            Sink::Standalone(dir) => {
                fs::create_dir_all(dir.as_path())?;
                let file = File::create(artifact_path(dir, &key, "json"))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &document)?;
                writer.flush()?;
            }
            Sink::Merge(root) => {
                if root.insert(key.clone(), document).is_some() {
                    warn!(table = %key, "table key already present in merged document, replaced");
                }
            }
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.table = None;
    }
}
