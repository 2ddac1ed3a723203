//! Header scanning: metadata rows to an ordered field list

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::model::{FieldSpec, Table, ValueKind};

/// Row holding parent-group names
pub const GROUP_ROW: usize = 1;
/// Row holding field names
pub const NAME_ROW: usize = 2;
/// Row holding type tags
pub const TAG_ROW: usize = 3;

/// Type tag marking a column that is present but not exported
pub const SKIP_TAG: &str = "#";

/// Fields of a table plus the column that decides row validity
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub fields: Vec<FieldSpec>,
    /// Source column of the first field, `None` when no field was found
    pub check_column: Option<usize>,
}

impl Header {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Scan the type-tag row left to right.
///
/// An empty tag cell ends the scan. A tag that is blank after trimming, or
/// is `#`, skips its column without ending it. Running past the table's
/// bounds ends the scan without error.
pub fn scan_header(table: &dyn Table) -> Header {
    let mut header = Header::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for col in 0..table.column_count() {
        let Some(tag) = table.cell(TAG_ROW, col) else {
            break;
        };
        if tag.is_empty() {
            break;
        }
        let tag = tag.trim();
        if tag.is_empty() || tag == SKIP_TAG {
            continue;
        }

        let name = cell_or_empty(table, NAME_ROW, col);
        let group = cell_or_empty(table, GROUP_ROW, col);

        if !seen.insert(format!("{}.{}", group, name)) {
            warn!(table = table.name(), field = %name, column = col, "duplicate field name");
        }

        let field = FieldSpec::new(name, ValueKind::from_tag(tag), col).with_parent_group(group);
        if header.check_column.is_none() {
            header.check_column = Some(field.source_column);
        }
        header.fields.push(field);
    }

    header
}

fn cell_or_empty(table: &dyn Table, row: usize, col: usize) -> String {
    table
        .cell(row, col)
        .map(|c| c.into_owned())
        .unwrap_or_default()
}
