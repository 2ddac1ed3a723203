//! Excel workbook reader (xlsx, xlsm, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::Table;

use super::Parser;

/// Sheets read per workbook at most
pub const MAX_SHEETS: usize = 100;

/// Parser for Excel workbooks; every worksheet is one table
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path) -> Result<Vec<Box<dyn Table>>> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let tables = workbook
            .worksheets()
            .into_iter()
            .take(MAX_SHEETS)
            .map(|(name, range)| Box::new(SheetTable::new(name, range)) as Box<dyn Table>)
            .collect();
        Ok(tables)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

/// A worksheet addressed from cell A1.
///
/// calamine trims leading empty rows and columns from a range; positions
/// before the range start read as empty cells so row and column indices stay
/// sheet-absolute.
pub struct SheetTable {
    name: String,
    range: Range<Data>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl Table for SheetTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, row: usize, col: usize) -> Option<Cow<'_, str>> {
        if row >= self.row_count() || col >= self.column_count() {
            return None;
        }
        let value = self.range.get_value((row as u32, col as u32));
        Some(value.map(cell_to_string).unwrap_or(Cow::Borrowed("")))
    }

    fn column_count(&self) -> usize {
        self.range.end().map(|(_, col)| col as usize + 1).unwrap_or(0)
    }

    fn row_count(&self) -> usize {
        self.range.end().map(|(row, _)| row as usize + 1).unwrap_or(0)
    }
}

pub(crate) fn cell_to_string(cell: &Data) -> Cow<'_, str> {
    match cell {
        Data::Empty => Cow::Borrowed(""),
        Data::String(s) => Cow::Borrowed(s.as_str()),
        Data::Float(f) => Cow::Owned(f.to_string()),
        Data::Int(i) => Cow::Owned(i.to_string()),
        Data::Bool(b) => Cow::Owned(b.to_string()),
        Data::DateTime(dt) => Cow::Owned(format_serial_date(dt.as_f64())),
        Data::DateTimeIso(s) => Cow::Borrowed(s.as_str()),
        Data::DurationIso(s) => Cow::Borrowed(s.as_str()),
        Data::Error(e) => Cow::Owned(format!("#{:?}", e)),
    }
}

/// Format an Excel serial date (days since 1899-12-30)
fn format_serial_date(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN);
    let millis = (serial * 86_400_000.0).round() as i64;
    let datetime: NaiveDateTime = epoch + Duration::milliseconds(millis);

    if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(1.0)), "1");
        assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_to_string(&Data::Int(-4)), "-4");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(format_serial_date(45000.0), "2023-03-15");
        assert_eq!(format_serial_date(45000.5), "2023-03-15 12:00:00");
    }

    #[test]
    fn test_sheet_table_is_a1_anchored() {
        let mut range = Range::new((1, 1), (4, 2));
        range.set_value((3, 1), Data::String("i32".to_string()));
        range.set_value((4, 1), Data::Float(7.0));
        let table = SheetTable::new("Sheet1", range);

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.cell(0, 0).as_deref(), Some(""));
        assert_eq!(table.cell(3, 1).as_deref(), Some("i32"));
        assert_eq!(table.cell(4, 1).as_deref(), Some("7"));
        assert_eq!(table.cell(5, 1), None);
        assert_eq!(table.cell(4, 3), None);
    }
}
