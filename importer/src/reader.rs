//! Sheet rows to locale tree.
//!
//! # Sheet layout
//!
//! ```text
//! | Screen ID | Key              | Module | en       | ja           | Note |
//! |-----------|------------------|--------|----------|--------------|------|
//! | (note row: instructions for translators, always skipped)              |
//! | LOGIN     | login.title      | auth   | Sign in  | サインイン    |      |
//! | LOGIN     | login.forgot     | auth   | Forgot?  |              | wip  |
//! ```
//!
//! The header is classified once per sheet into a [`SheetSchema`]:
//! `Key` and `Module` are structural, configured columns are ignored,
//! and every other column is a locale. Empty message cells are skipped,
//! so a missing translation never produces an empty string.

use std::collections::{HashMap, HashSet};

use crate::catalog::{
    is_path_safe, CatalogBuilder, ConflictPolicy, InsertOutcome, KeyPath, KeyPathError, LocaleTree,
};
use crate::config::ImportConfig;
use crate::error::{CatalogError, ImportResult, RowLocation, SchemaError};
use crate::logs::{log_info, log_info_indent, log_warning};
use crate::workbook::{RawRow, Workbook};

pub const KEY_COLUMN: &str = "Key";
pub const MODULE_COLUMN: &str = "Module";

/// Role of one header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    Key,
    Module,
    Ignored,
    Locale(String),
}

/// Column classification of a sheet header.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSchema {
    pub sheet: String,
    pub roles: Vec<ColumnRole>,
    key: usize,
    module: usize,
}

impl SheetSchema {
    /// Classify headers. Duplicate header names get `_1`, `_2`, ... suffixes,
    /// blank headers are ignored.
    pub fn classify(sheet: &str, headers: &[String], ignored_cols: &[String]) -> Result<Self, SchemaError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut key = None;
        let mut module = None;
        let mut roles = Vec::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let header = header.trim();
            if header.is_empty() {
                roles.push(ColumnRole::Ignored);
                continue;
            }

            let count = seen.entry(header).or_insert(0);
            let name = if *count == 0 {
                header.to_string()
            } else {
                log_warning(format!("Sheet '{}': duplicate column '{}' renamed to '{}_{}'", sheet, header, header, count));
                format!("{}_{}", header, count)
            };
            *count += 1;

            let role = if ignored_cols.iter().any(|c| *c == name) {
                ColumnRole::Ignored
            } else if name == KEY_COLUMN {
                key = Some(i);
                ColumnRole::Key
            } else if name == MODULE_COLUMN {
                module = Some(i);
                ColumnRole::Module
            } else if is_path_safe(&name) {
                ColumnRole::Locale(name)
            } else {
                return Err(SchemaError::InvalidLocale { sheet: sheet.to_string(), column: name });
            };
            roles.push(role);
        }

        let missing = |column| SchemaError::MissingColumn { sheet: sheet.to_string(), column };
        Ok(Self {
            sheet: sheet.to_string(),
            roles,
            key: key.ok_or_else(|| missing(KEY_COLUMN))?,
            module: module.ok_or_else(|| missing(MODULE_COLUMN))?,
        })
    }

    /// Locale columns in header order.
    pub fn locales(&self) -> Vec<&str> {
        self.locale_columns().map(|(_, l)| l).collect()
    }

    fn locale_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.roles.iter().enumerate().filter_map(|(i, role)| match role {
            ColumnRole::Locale(l) => Some((i, l.as_str())),
            _ => None,
        })
    }
}

/// Result of reading all requested sheets.
#[derive(Debug, Clone, Default)]
pub struct ReadReport {
    /// Data rows across processed sheets, note rows excluded
    pub total_rows: usize,
    pub messages: LocaleTree,
    /// Requested sheets the workbook does not contain
    pub missing_sheets: Vec<String>,
    /// Rows whose write hit an existing node
    pub conflicts: usize,
}

/// Read every sheet listed in the config into one locale tree.
pub fn read_workbook(workbook: &mut dyn Workbook, config: &ImportConfig) -> ImportResult<ReadReport> {
    let mut builder = CatalogBuilder::new(config.on_conflict);
    let mut report = ReadReport::default();

    let mut requested = HashSet::new();

    for sheet_name in &config.sheet_names {
        if !requested.insert(sheet_name.as_str()) {
            log_warning(format!("Sheet '{}' is listed more than once, reading it once", sheet_name));
            continue;
        }

        let Some(sheet) = workbook.sheet(sheet_name)? else {
            log_warning(format!("Sheet '{}' does not exist!", sheet_name));
            log_info_indent(format!("Available sheets: {}", workbook.sheet_names().join(", ")), 1);
            report.missing_sheets.push(sheet_name.clone());
            continue;
        };

        let schema = SheetSchema::classify(&sheet.name, &sheet.headers, &config.ignored_cols)?;

        // First data row is the translators' note
        let rows = sheet.rows.get(1..).unwrap_or_default();
        report.total_rows += rows.len();
        log_info(format!("Sheet '{}': {} rows, locales [{}]", sheet.name, rows.len(), schema.locales().join(", ")));

        for row in rows {
            if insert_row(&mut builder, &schema, row)? {
                report.conflicts += 1;
            }
        }
    }

    report.messages = builder.finalize();
    Ok(report)
}

/// Insert one row into the builder. Returns whether any locale conflicted.
pub fn insert_row(builder: &mut CatalogBuilder, schema: &SheetSchema, row: &RawRow) -> ImportResult<bool> {
    let cell = |i: usize| row.cells.get(i).map(String::as_str).unwrap_or("");

    let messages: Vec<(&str, &str)> = schema
        .locale_columns()
        .map(|(i, locale)| (locale, cell(i)))
        .filter(|(_, message)| !message.is_empty())
        .collect();
    if messages.is_empty() {
        return Ok(false);
    }

    let location = RowLocation { sheet: schema.sheet.clone(), row: row.number };
    let raw_key = cell(schema.key);
    let key = KeyPath::parse(raw_key).map_err(|e| match e {
        KeyPathError::Empty => CatalogError::EmptyKey { location: location.clone() },
        KeyPathError::EmptySegment => CatalogError::EmptySegment {
            location: location.clone(),
            key: raw_key.to_string(),
        },
    })?;

    let module = cell(schema.module).trim();
    if module.is_empty() {
        return Err(CatalogError::EmptyModule { location }.into());
    }
    if !is_path_safe(module) {
        return Err(CatalogError::InvalidModule { location, module: module.to_string() }.into());
    }

    let mut conflicted = false;
    for (locale, message) in messages {
        match builder.insert(locale, module, &key, message) {
            InsertOutcome::Inserted => {}
            InsertOutcome::Rejected => {
                return Err(CatalogError::Conflict {
                    location,
                    locale: locale.to_string(),
                    module: module.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
            InsertOutcome::Kept | InsertOutcome::Replaced => {
                if !conflicted {
                    let action = match builder.policy() {
                        ConflictPolicy::LastWins => "replacing the earlier entry",
                        _ => "keeping the earlier entry",
                    };
                    log_warning(format!("{}: Key '{}' in module '{}' conflicts, {}", location, key, module, action));
                }
                conflicted = true;
            }
        }
    }

    Ok(conflicted)
}
