//! Error types for table export

use thiserror::Error;

use crate::model::ValueKind;

/// Errors raised while exporting a table
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("table {table}: field {field} has kind {kind}, which the binary format cannot encode")]
    UnsupportedKind {
        table: String,
        field: String,
        kind: ValueKind,
    },

    #[error("table {table}: {name:?} is not a valid XML element name")]
    InvalidXmlName { table: String, name: String },

    #[error("field {field}: array of {len} elements exceeds the u16 element count")]
    ArrayTooLong { field: String, len: usize },

    #[error("no table is being exported")]
    NoActiveTable,
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
