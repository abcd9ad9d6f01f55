//! Excel and OpenDocument spreadsheets via calamine.

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{SheetData, Workbook};
use crate::error::{WorkbookError, WorkbookResult};

/// Render a cell as message text.
///
/// Integral numbers lose their `.0` so a numeric `Key` such as `404`
/// reads the same as it displays in the spreadsheet.
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Convert a calamine range to a sheet, keeping absolute row numbers.
pub fn range_to_sheet(name: &str, range: &Range<Data>) -> SheetData {
    let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect();
    SheetData::from_grid(name, first_row, grid)
}

/// Workbook opened with calamine (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`).
pub struct SpreadsheetWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl SpreadsheetWorkbook {
    pub fn open(path: &Path) -> WorkbookResult<Self> {
        let inner = open_workbook_auto(path).map_err(|e| match e {
            calamine::Error::Io(source) => WorkbookError::Io { path: path.to_path_buf(), source },
            other => WorkbookError::Invalid { path: path.to_path_buf(), message: other.to_string() },
        })?;
        Ok(Self { path: path.to_path_buf(), inner })
    }
}

impl Workbook for SpreadsheetWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    fn sheet(&mut self, name: &str) -> WorkbookResult<Option<SheetData>> {
        if !self.inner.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        let range = self.inner.worksheet_range(name).map_err(|e| WorkbookError::Invalid {
            path: self.path.clone(),
            message: format!("sheet '{}': {}", name, e),
        })?;
        Ok(Some(range_to_sheet(name, &range)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_text() {
        assert_eq!(cell_to_text(&Data::Empty), "");
        assert_eq!(cell_to_text(&Data::String("Hello".into())), "Hello");
        assert_eq!(cell_to_text(&Data::Float(404.0)), "404");
        assert_eq!(cell_to_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_text(&Data::Int(7)), "7");
        assert_eq!(cell_to_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_range_keeps_absolute_row_numbers() {
        let mut range = Range::new((2, 0), (4, 1));
        range.set_value((2, 0), Data::String("Key".into()));
        range.set_value((2, 1), Data::String("Module".into()));
        range.set_value((3, 0), Data::String("note".into()));
        range.set_value((4, 0), Data::String("a.b".into()));
        range.set_value((4, 1), Data::String("common".into()));

        let sheet = range_to_sheet("S", &range);
        assert_eq!(sheet.headers, vec!["Key", "Module"]);
        assert_eq!(sheet.rows[0].number, 4);
        assert_eq!(sheet.rows[1].number, 5);
        assert_eq!(sheet.rows[1].cells, vec!["a.b", "common"]);
    }

    #[test]
    fn test_open_garbage_is_invalid_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = SpreadsheetWorkbook::open(&path).err().unwrap();
        assert!(matches!(err, WorkbookError::Invalid { .. }));
    }
}
