//! Error types for the locale import pipeline.
//!
//! One error type per stage, wrapped by the top-level [`ImportError`]:
//!
//! - [`ConfigError`] - Flag and configuration errors
//! - [`WorkbookError`] - Opening and decoding the source workbook
//! - [`SchemaError`] - Sheet headers missing structural columns
//! - [`CatalogError`] - Rows that cannot be placed in the message tree
//! - [`ImportError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while turning flags into an [`crate::ImportConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A flag that needs a value was the last argument.
    #[error("Flag '--{0}' expects a value")]
    MissingValue(String),

    /// Unknown conflict policy name.
    #[error("Unknown conflict policy '{0}' (expected first, last or error)")]
    UnknownConflictPolicy(String),

    /// Relative paths could not be resolved.
    #[error("Cannot resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

// =============================================================================
// Workbook Errors
// =============================================================================

/// Errors while opening or decoding the source workbook.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// The source path does not exist.
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read the source.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a readable spreadsheet.
    #[error("Invalid workbook '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },

    /// The file extension is not a supported tabular format.
    #[error("Unsupported workbook format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Malformed CSV content.
    #[error("Invalid CSV in '{}' at line {line}: {message}", path.display())]
    Csv {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors while classifying a sheet header.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A structural column is absent from the header row.
    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: &'static str },

    /// A locale header that cannot be used as a directory name.
    #[error("Sheet '{sheet}': locale column '{column}' is not a valid directory name")]
    InvalidLocale { sheet: String, column: String },
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Location of a row in the source workbook (1-based spreadsheet row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLocation {
    pub sheet: String,
    pub row: usize,
}

impl std::fmt::Display for RowLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sheet '{}', row {}", self.sheet, self.row)
    }
}

/// Errors while inserting a row into the message tree.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The `Key` cell is empty.
    #[error("{location}: empty Key")]
    EmptyKey { location: RowLocation },

    /// A key path contains an empty segment, e.g. `a..b`.
    #[error("{location}: Key '{key}' has an empty segment")]
    EmptySegment { location: RowLocation, key: String },

    /// The `Module` cell is empty.
    #[error("{location}: empty Module")]
    EmptyModule { location: RowLocation },

    /// The `Module` cell cannot be used as a file name.
    #[error("{location}: Module '{module}' is not a valid file name")]
    InvalidModule { location: RowLocation, module: String },

    /// Two rows write incompatible nodes at the same path.
    #[error("{location}: Key '{key}' conflicts with an existing entry in {locale}/{module}")]
    Conflict {
        location: RowLocation,
        locale: String,
        module: String,
        key: String,
    },
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level pipeline error returned by [`crate::run_import`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Workbook error.
    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// Schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Catalog error.
    #[error("Data error: {0}")]
    Catalog(#[from] CatalogError),

    /// Reading the confirmation answer failed.
    #[error("Prompt error: {0}")]
    Prompt(#[source] std::io::Error),

    /// Writing preview output failed.
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),
}

impl ImportError {
    /// Process exit code for this failure. 0 is never returned.
    ///
    /// 1 output, 2 usage, 3 unreadable source, 4 invalid workbook,
    /// 5 invalid sheet data, 6 prompt I/O.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::Output(_) => 1,
            ImportError::Config(_) => 2,
            ImportError::Workbook(WorkbookError::NotFound(_) | WorkbookError::Io { .. }) => 3,
            ImportError::Workbook(_) => 4,
            ImportError::Schema(_) | ImportError::Catalog(_) => 5,
            ImportError::Prompt(_) => 6,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for workbook operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Result type for the whole import.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_cause() {
        let missing: ImportError = WorkbookError::NotFound("a.xlsx".into()).into();
        let invalid: ImportError = WorkbookError::Invalid {
            path: "a.xlsx".into(),
            message: "not a zip".into(),
        }
        .into();
        let schema: ImportError = SchemaError::MissingColumn {
            sheet: "Locale Messages".into(),
            column: "Key",
        }
        .into();

        assert_eq!(missing.exit_code(), 3);
        assert_eq!(invalid.exit_code(), 4);
        assert_eq!(schema.exit_code(), 5);
        assert_eq!(ImportError::from(ConfigError::MissingValue("source".into())).exit_code(), 2);
    }

    #[test]
    fn test_catalog_error_reports_location() {
        let err = CatalogError::EmptySegment {
            location: RowLocation { sheet: "Locale Messages".into(), row: 7 },
            key: "a..b".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sheet 'Locale Messages', row 7"));
        assert!(msg.contains("a..b"));
    }
}
