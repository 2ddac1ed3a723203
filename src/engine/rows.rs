//! Data row iteration

use crate::model::Table;

/// First data row (zero-based)
pub const FIRST_DATA_ROW: usize = 4;

/// Hard ceiling on data rows per table
pub const MAX_DATA_ROWS: usize = 65535;

/// Yields the indices of valid data rows.
///
/// A row is valid while its check-column cell is non-empty. The first empty
/// or out-of-bounds check cell ends the walk.
pub struct RowWalker<'t> {
    table: &'t dyn Table,
    check_column: Option<usize>,
    next_row: usize,
    done: bool,
}

impl<'t> RowWalker<'t> {
    pub fn new(table: &'t dyn Table, check_column: Option<usize>) -> Self {
        Self {
            table,
            check_column,
            next_row: FIRST_DATA_ROW,
            done: false,
        }
    }
}

impl Iterator for RowWalker<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done || self.next_row >= FIRST_DATA_ROW + MAX_DATA_ROWS {
            return None;
        }

        let valid = self
            .check_column
            .and_then(|col| self.table.cell(self.next_row, col))
            .is_some_and(|cell| !cell.is_empty());
        if !valid {
            self.done = true;
            return None;
        }

        let row = self.next_row;
        self.next_row += 1;
        Some(row)
    }
}
