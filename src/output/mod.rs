//! Output encoders for exported tables

mod binary;
mod json;
mod xml;

use std::path::{Path, PathBuf};

use crate::engine::Record;
use crate::error::Result;
use crate::model::{FieldSpec, TableTarget};

pub use binary::{combine_tables, write_key_stream, write_string, BinaryEncoder, DataStream};
pub use json::{JsonEncoder, ITEMS_KEY};
pub use xml::{XmlElement, XmlEncoder, ITEM_ELEMENT, MERGE_ROOT};

/// Receives one table at a time from the exporter.
///
/// Call order per table is `begin`, any number of `record`, then `finish`.
/// `abort` replaces `finish` when the table fails part-way and must release
/// anything the encoder holds for it.
pub trait TableEncoder {
    /// Start a table with its resolved field list
    fn begin(&mut self, target: &TableTarget, fields: &[FieldSpec]) -> Result<()>;

    /// Encode one valid data row
    fn record(&mut self, record: &Record<'_>) -> Result<()>;

    /// Finalize the table's artifact
    fn finish(&mut self, rows: usize) -> Result<()>;

    /// Drop any partial state for the current table
    fn abort(&mut self) {}
}

/// `<dir>/<stem>.<ext>`
pub fn artifact_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, ext))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::MemTable;

    /// One sample cell per scalar and single-level array tag
    pub const KIND_SAMPLES: &[(&str, &str)] = &[
        ("s", "hello"),
        ("b", "1"),
        ("i8", "-128"),
        ("u8", "255"),
        ("i16", "-300"),
        ("u16", "65535"),
        ("i32", "-70000"),
        ("u32", "4000000000"),
        ("i64", "-9000000000"),
        ("u64", "18000000000000000000"),
        ("f", "0.25"),
        ("d", "1.125"),
        ("as", "a,b"),
        ("ab", "1,0,-1"),
        ("ai8", "-5,7"),
        ("au8", "1,2"),
        ("ai16", "-1,300"),
        ("au16", "9,65535"),
        ("ai32", "-1,2"),
        ("au32", "3,4000000000"),
        ("ai64", "-9000000000,1"),
        ("au64", "5,6"),
        ("af", "0.5,1.5"),
        ("ad", "2.25,x"),
    ];

    /// Field name of a sample column
    pub fn sample_name(index: usize) -> String {
        format!("F{}", index)
    }

    /// Table named `Kinds` with one data row holding every sample
    pub fn kind_table() -> MemTable {
        let blank = vec![String::new(); KIND_SAMPLES.len()];
        let names = (0..KIND_SAMPLES.len()).map(sample_name).collect();
        let tags = KIND_SAMPLES.iter().map(|(tag, _)| tag.to_string()).collect();
        let data = KIND_SAMPLES.iter().map(|(_, raw)| raw.to_string()).collect();
        MemTable::new("Kinds", vec![blank.clone(), blank, names, tags, data])
    }
}
