//! CSV sheets with encoding and delimiter auto-detection.
//!
//! A single `.csv` file is a one-sheet workbook named after its file stem.
//! A directory is a workbook with one sheet per `*.csv` file, which is how
//! most spreadsheet tools export a multi-sheet document as CSV.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{SheetData, Workbook};
use crate::error::{WorkbookError, WorkbookResult};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "shift_jis" | "shift-jis" | "sjis" => "shift_jis".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to text. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Decode file bytes: valid UTF-8 is taken as is, anything else is detected.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    decode_content(bytes, &encoding)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded CSV text into a sheet.
pub fn parse_sheet(name: &str, path: &Path, content: &str) -> WorkbookResult<SheetData> {
    let delimiter = detect_delimiter(content);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    let mut first_line = None;

    for record in reader.records() {
        let record = record.map_err(|e| WorkbookError::Csv {
            path: path.to_path_buf(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;

        let line = record.position().map(|p| p.line() as usize).unwrap_or(grid.len() + 1);
        first_line.get_or_insert(line);

        // Keep line numbers aligned with the file even across multi-line cells
        let expected = first_line.unwrap_or(1) + grid.len();
        for _ in expected..line {
            grid.push(Vec::new());
        }
        grid.push(record.iter().map(String::from).collect());
    }

    Ok(SheetData::from_grid(name, first_line.unwrap_or(1), grid))
}

/// Read one CSV file from disk.
fn read_sheet_file(name: &str, path: &Path) -> WorkbookResult<SheetData> {
    let bytes = fs::read(path).map_err(|source| WorkbookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sheet(name, path, &decode_bytes(&bytes))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Workbook backed by CSV files. Sheets are read lazily.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    sheets: BTreeMap<String, PathBuf>,
}

impl CsvWorkbook {
    /// A single file, one sheet named after the file stem.
    pub fn open_file(path: &Path) -> WorkbookResult<Self> {
        let mut sheets = BTreeMap::new();
        sheets.insert(stem(path), path.to_path_buf());
        Ok(Self { sheets })
    }

    /// Every `*.csv` file in `dir`, one sheet each.
    pub fn open_dir(dir: &Path) -> WorkbookResult<Self> {
        let io_err = |source| WorkbookError::Io { path: dir.to_path_buf(), source };

        let mut sheets = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_csv = path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                sheets.insert(stem(&path), path);
            }
        }
        Ok(Self { sheets })
    }
}

impl Workbook for CsvWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn sheet(&mut self, name: &str) -> WorkbookResult<Option<SheetData>> {
        match self.sheets.get(name) {
            Some(path) => read_sheet_file(name, path).map(Some),
            None => Ok(None),
        }
    }
}
