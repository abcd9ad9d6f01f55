//! Pre-write summary and the overwrite confirmation.
//!
//! Nothing is written until a [`Confirm`] implementation answers yes.
//! The CLI uses [`StdinConfirm`], or [`AssumeYes`] with `--yes`; tests
//! pass a closure.

use chrono::{DateTime, Local};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::reader::ReadReport;

pub const OVERWRITE_PROMPT: &str =
    "Current json files (if any) will be overwritten, do you want to continue? (y/N) ";

/// Answers the overwrite question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Ok(self(prompt))
    }
}

/// Reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Always yes, for non-interactive runs.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Human readable file size: `512 bytes`, `1.5 KB`, `20 MB`.
pub fn nice_bytes(bytes: u64) -> String {
    const UNITS: [&str; 9] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

    let mut n = bytes as f64;
    let mut unit = 0;
    while n >= 1024.0 && unit < UNITS.len() - 1 {
        n /= 1024.0;
        unit += 1;
    }

    let decimals = if n < 10.0 && unit > 0 { 1 } else { 0 };
    format!("{:.*} {}", decimals, n, UNITS[unit])
}

/// What the user is shown before confirming.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub source: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub locales: Vec<String>,
    pub total_rows: usize,
    pub out_dir: PathBuf,
}

impl ImportSummary {
    pub fn collect(source: &Path, out_dir: &Path, report: &ReadReport) -> io::Result<Self> {
        let meta = std::fs::metadata(source)?;
        let modified = meta.modified().or_else(|_| meta.created()).ok().map(DateTime::<Local>::from);

        Ok(Self {
            source: source.to_path_buf(),
            size: meta.len(),
            modified,
            locales: report.messages.locale_names().into_iter().map(String::from).collect(),
            total_rows: report.total_rows,
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn render(&self) -> String {
        let modified = self
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let locales = if self.locales.is_empty() {
            "(none)".to_string()
        } else {
            self.locales.join(", ")
        };

        let mut out = String::from("\n🛠  Import locales from spreadsheet\n\n");
        out.push_str("Input file:\n");
        out.push_str(&format!("  • Path:            {}\n", self.source.display()));
        out.push_str(&format!("  • Size:            {}\n", nice_bytes(self.size)));
        out.push_str(&format!("  • Last updated at: {}\n", modified));
        out.push_str(&format!("  • Found locales:   {}\n", locales));
        out.push_str(&format!(
            "  • Total rows:      {} {}\n",
            self.total_rows,
            if self.total_rows == 1 { "row" } else { "rows" }
        ));
        out.push_str("Output directory:\n");
        out.push_str(&format!("  • Path:            {}\n", self.out_dir.display()));
        out
    }

    pub fn print(&self) {
        eprintln!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, KeyPath};

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("YES\n"));
        assert!(is_affirmative("  Yes "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yeah"));
    }

    #[test]
    fn test_nice_bytes() {
        assert_eq!(nice_bytes(0), "0 bytes");
        assert_eq!(nice_bytes(1023), "1023 bytes");
        assert_eq!(nice_bytes(1536), "1.5 KB");
        assert_eq!(nice_bytes(20 * 1024), "20 KB");
        assert_eq!(nice_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_closure_confirm() {
        let mut asked = Vec::new();
        let mut confirm = |prompt: &str| {
            asked.push(prompt.to_string());
            false
        };
        assert!(!confirm.confirm(OVERWRITE_PROMPT).unwrap());
        assert_eq!(asked, vec![OVERWRITE_PROMPT]);
        assert!(AssumeYes.confirm(OVERWRITE_PROMPT).unwrap());
    }

    #[test]
    fn test_summary_render() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        std::fs::write(&source, "Key,Module,en\n").unwrap();

        let mut builder = CatalogBuilder::default();
        builder.insert("en", "common", &KeyPath::parse("a").unwrap(), "A");
        builder.insert("ja", "common", &KeyPath::parse("a").unwrap(), "あ");
        let report = ReadReport { total_rows: 1, messages: builder.finalize(), ..ReadReport::default() };

        let summary = ImportSummary::collect(&source, &dir.path().join("out"), &report).unwrap();
        let text = summary.render();

        assert_eq!(summary.size, 14);
        assert!(text.contains("14 bytes"));
        assert!(text.contains("en, ja"));
        assert!(text.contains("1 row\n"));
        assert!(summary.modified.is_some());
    }
}
