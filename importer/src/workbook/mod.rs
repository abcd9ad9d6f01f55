//! Tabular sources exposing named sheets.
//!
//! A sheet is read as a grid of text cells. The first row is the header;
//! everything below it is data. Fully blank rows are dropped, but the
//! remaining rows keep their original 1-based row number so later errors
//! can point at the spreadsheet line.
//!
//! # Supported sources
//!
//! | Path                               | Backend                     |
//! |------------------------------------|-----------------------------|
//! | `.xlsx` `.xlsm` `.xlsb` `.xls` `.ods` | [`xlsx::SpreadsheetWorkbook`] |
//! | `.csv` `.tsv`                      | [`csv::CsvWorkbook`] (one sheet) |
//! | directory of `*.csv`               | [`csv::CsvWorkbook`] (sheet per file) |

pub mod csv;
pub mod xlsx;

use std::path::Path;

use crate::error::{WorkbookError, WorkbookResult};

pub use self::csv::CsvWorkbook;
pub use self::xlsx::SpreadsheetWorkbook;

/// A data row with its position in the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based row number in the spreadsheet
    pub number: usize,
    pub cells: Vec<String>,
}

/// One sheet: header cells and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    /// Build a sheet from a grid whose first row sits at `first_row_number`.
    pub fn from_grid(name: impl Into<String>, first_row_number: usize, grid: Vec<Vec<String>>) -> Self {
        let mut numbered = grid
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow { number: first_row_number + i, cells });

        let headers = numbered
            .next()
            .map(|row| row.cells.iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();

        let rows = numbered
            .filter(|row| row.cells.iter().any(|c| !c.trim().is_empty()))
            .collect();

        Self { name: name.into(), headers, rows }
    }
}

/// A source of named sheets.
pub trait Workbook {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read a sheet, or `None` if the workbook has no sheet by that name.
    fn sheet(&mut self, name: &str) -> WorkbookResult<Option<SheetData>>;
}

/// In-memory workbook, for tests and for callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetData>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet from string rows; the first row is the header.
    pub fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        self.sheets.push(SheetData::from_grid(name, 1, grid));
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn sheet(&mut self, name: &str) -> WorkbookResult<Option<SheetData>> {
        Ok(self.sheets.iter().find(|s| s.name == name).cloned())
    }
}

/// Open a workbook, picking the backend from the path.
pub fn open_workbook(path: &Path) -> WorkbookResult<Box<dyn Workbook>> {
    if !path.exists() {
        return Err(WorkbookError::NotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        return Ok(Box::new(CsvWorkbook::open_dir(path)?));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(SpreadsheetWorkbook::open(path)?)),
        "csv" | "tsv" => Ok(Box::new(CsvWorkbook::open_file(path)?)),
        _ => Err(WorkbookError::UnsupportedFormat(path.to_path_buf())),
    }
}
