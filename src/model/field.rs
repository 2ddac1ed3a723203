//! Field metadata read from a table's header rows

use super::kind::ValueKind;

/// One exported column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name (header row 2)
    pub name: String,
    /// Grouping name (header row 1), empty for top-level fields
    pub parent_group: String,
    /// Kind resolved from the type tag (header row 3)
    pub kind: ValueKind,
    /// Column index of the field's cells in every data row
    pub source_column: usize,
}

impl FieldSpec {
    /// Create a top-level field
    pub fn new(name: impl Into<String>, kind: ValueKind, source_column: usize) -> Self {
        Self {
            name: name.into(),
            parent_group: String::new(),
            kind,
            source_column,
        }
    }

    /// Set the parent group
    pub fn with_parent_group(mut self, group: impl Into<String>) -> Self {
        self.parent_group = group.into();
        self
    }

    pub fn is_grouped(&self) -> bool {
        !self.parent_group.is_empty()
    }

    /// Dotted element path: `group.name` for grouped fields, `name` otherwise
    pub fn path(&self) -> String {
        if self.is_grouped() {
            format!("{}.{}", self.parent_group, self.name)
        } else {
            self.name.clone()
        }
    }
}
