//! Progress reporting for export runs

use std::path::Path;

use tracing::{info, warn};

/// Receives progress events from the exporter and the runner.
///
/// All methods default to no-ops so implementors only pick what they need.
pub trait ProgressReporter {
    fn workbook_started(&self, _path: &Path) {}

    fn table_started(&self, _table: &str) {}

    fn table_skipped(&self, _table: &str) {}

    fn table_finished(&self, _table: &str, _rows: usize) {}

    fn table_failed(&self, _table: &str, _error: &dyn std::fmt::Display) {}
}

/// Reports progress as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn workbook_started(&self, path: &Path) {
        info!(path = %path.display(), "processing workbook");
    }

    fn table_started(&self, table: &str) {
        info!(table, "processing table");
    }

    fn table_skipped(&self, table: &str) {
        info!(table, "skipping table");
    }

    fn table_finished(&self, table: &str, rows: usize) {
        info!(table, rows, "table exported");
    }

    fn table_failed(&self, table: &str, error: &dyn std::fmt::Display) {
        warn!(table, error = %error, "table export failed");
    }
}

/// Discards all progress events
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {}
