//! sheetpack - Typed spreadsheet export
//!
//! Reads tables whose leading rows declare field groups, names and type tags,
//! coerces every data cell to its declared type, and writes the result as
//! JSON, XML, or a length-prefixed binary record stream with a schema key.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod progress;
pub mod runner;

pub use config::{Config, OutputFormat};
pub use engine::Exporter;
pub use error::{ExportError, Result};
pub use model::Table;
pub use runner::{run_export, ExportReport};
