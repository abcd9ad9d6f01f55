//! End-to-end import: read, summarize, confirm, write.
//!
//! ```text
//! ImportConfig ─▶ open_workbook ─▶ read_workbook ─▶ summary + Confirm ─▶ write_files
//!                                                          │
//!                                                     "no" └─▶ Cancelled (nothing written)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use i18n_import::{run_import, AssumeYes, ImportConfig, ImportOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImportConfig::default().resolved()?;
//!     if let ImportOutcome::Completed { report, .. } = run_import(&config, &mut AssumeYes).await? {
//!         println!("{} files written", report.succeeded());
//!     }
//!     Ok(())
//! }
//! ```

use std::time::{Duration, Instant};

use crate::config::ImportConfig;
use crate::confirm::{Confirm, ImportSummary, OVERWRITE_PROMPT};
use crate::emit::{write_files, EmitReport};
use crate::error::{ImportError, ImportResult, WorkbookError};
use crate::logs::{log_info, log_warning};
use crate::reader::{read_workbook, ReadReport};
use crate::workbook::open_workbook;

/// How a run ended.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The user declined; nothing was written.
    Cancelled { read: ReadReport },
    Completed {
        read: ReadReport,
        report: EmitReport,
        elapsed: Duration,
    },
}

/// Read the workbook into a locale tree without writing anything.
pub fn preview_import(config: &ImportConfig) -> ImportResult<ReadReport> {
    log_info(format!("📖 Reading {}", config.source.display()));
    let mut workbook = open_workbook(&config.source)?;
    read_workbook(workbook.as_mut(), config)
}

/// Run the full import, asking `confirm` before any file is touched.
pub async fn run_import(config: &ImportConfig, confirm: &mut dyn Confirm) -> ImportResult<ImportOutcome> {
    let read = preview_import(config)?;

    let summary = ImportSummary::collect(&config.source, &config.out_dir, &read).map_err(|source| {
        WorkbookError::Io { path: config.source.clone(), source }
    })?;
    summary.print();

    if !confirm.confirm(OVERWRITE_PROMPT).map_err(ImportError::Prompt)? {
        log_warning("Import has been cancelled!");
        return Ok(ImportOutcome::Cancelled { read });
    }

    let start = Instant::now();
    let report = write_files(&read.messages, &config.out_dir, &config.index_ext).await;
    let elapsed = start.elapsed();

    Ok(ImportOutcome::Completed { read, report, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const SOURCE: &str = "\
Screen ID,Key,Module,en,ja,vi,Note
,Key path,File name,English,Japanese,Vietnamese,Do not translate brand names
HOME,home.title,common,Welcome,ようこそ,Chào mừng,
HOME,home.cta,common,Start,開始,Bắt đầu,
ERR,E404,errors,Not found,見つかりません,Không tìm thấy,internal
";

    fn setup(dir: &Path) -> ImportConfig {
        let source = dir.join("messages");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Locale Messages.csv"), SOURCE).unwrap();

        ImportConfig {
            source,
            out_dir: dir.join("locales"),
            ..ImportConfig::default()
        }
    }

    fn snapshot(dir: &Path) -> Vec<(String, String)> {
        let mut files = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            for entry in fs::read_dir(&current).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                    files.push((rel, fs::read_to_string(&path).unwrap()));
                }
            }
        }
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_declined_confirmation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        let mut decline = |_: &str| false;
        let outcome = run_import(&config, &mut decline).await.unwrap();

        assert!(matches!(outcome, ImportOutcome::Cancelled { .. }));
        assert!(!config.out_dir.exists());
    }

    #[tokio::test]
    async fn test_full_import_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        let mut accept = |_: &str| true;
        let outcome = run_import(&config, &mut accept).await.unwrap();

        let ImportOutcome::Completed { read, report, .. } = outcome else {
            panic!("import was cancelled");
        };
        assert_eq!(read.total_rows, 3);
        // 3 locales x 2 modules + 3 locale indexes + 1 root index
        assert_eq!(report.succeeded(), 10);

        let common: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.out_dir.join("ja/common.json")).unwrap()).unwrap();
        assert_eq!(common, serde_json::json!({ "home": { "title": "ようこそ", "cta": "開始" } }));

        let files = snapshot(&config.out_dir);
        assert!(files.iter().all(|(_, body)| !body.contains("internal")));
        assert!(files.iter().all(|(_, body)| !body.contains("Do not translate")));
    }

    #[tokio::test]
    async fn test_reimport_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        run_import(&config, &mut |_: &str| true).await.unwrap();
        let first = snapshot(&config.out_dir);
        run_import(&config, &mut |_: &str| true).await.unwrap();
        let second = snapshot(&config.out_dir);

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ImportConfig {
            source: dir.path().join("nope.xlsx"),
            out_dir: dir.path().join("locales"),
            ..ImportConfig::default()
        };

        let err = run_import(&config, &mut |_: &str| true).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!config.out_dir.exists());
    }
}
