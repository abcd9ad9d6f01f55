//! # i18n-import - Spreadsheet to locale resource bundles
//!
//! Reads translator-maintained spreadsheets (one row per message, one
//! column per locale) and writes per-locale, per-module JSON files plus
//! index modules that bundle them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Flags    │────▶│  Workbook   │────▶│   Catalog   │────▶│   Confirm   │────▶│   Emitter   │
//! │ (camelized) │     │ (xlsx/csv)  │     │ (key tree)  │     │  (summary)  │     │ (json + ts) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use i18n_import::{preview_import, ImportConfig};
//!
//! let report = preview_import(&ImportConfig::default())?;
//! println!("{} rows, locales {:?}", report.total_rows, report.messages.locale_names());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types and exit codes
//! - [`logs`] - Diagnostic broadcaster
//! - [`config`] - Import configuration and flag normalization
//! - [`workbook`] - Spreadsheet and CSV sources
//! - [`reader`] - Sheet schema and row processing
//! - [`catalog`] - Locale/module message trees
//! - [`confirm`] - Summary and overwrite confirmation
//! - [`emit`] - Concurrent file output
//! - [`pipeline`] - End-to-end orchestration

// Core modules
pub mod error;
pub mod logs;
pub mod config;

// Reading
pub mod workbook;
pub mod reader;
pub mod catalog;

// Writing
pub mod confirm;
pub mod emit;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    CatalogError,
    ConfigError,
    ImportError,
    ImportResult,
    RowLocation,
    SchemaError,
    WorkbookError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{camelize, normalize_args, split_list, ImportConfig, NormalizedArgs};

// =============================================================================
// Re-exports - Workbooks
// =============================================================================

pub use workbook::{open_workbook, CsvWorkbook, MemoryWorkbook, SheetData, SpreadsheetWorkbook, Workbook};

// =============================================================================
// Re-exports - Catalog
// =============================================================================

pub use catalog::{CatalogBuilder, ConflictPolicy, InsertOutcome, KeyPath, LocaleTree};
pub use reader::{read_workbook, ReadReport, SheetSchema};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use confirm::{AssumeYes, Confirm, ImportSummary, StdinConfirm};
pub use emit::{write_files, EmitReport, WriteOutcome};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{preview_import, run_import, ImportOutcome};
