//! i18n-import CLI - Compile a localization spreadsheet into locale bundles
//!
//! # Commands
//!
//! ```bash
//! i18n-import run --source i18n/source.xlsx --out-dir public/locales \
//!     --sheet-names "Locale Messages, Server Error Messages"
//! i18n-import run --yes                     # non-interactive, defaults for everything
//! i18n-import preview -o tree.json          # compile only, print the locale tree
//! ```
//!
//! Flag names are case and separator insensitive (`--out-dir`, `--out_dir`,
//! `--outDir`). Unknown flags are reported and ignored.
//!
//! # Exit codes
//!
//! `0` done or cancelled, `1` output error, `2` usage, `3` source unreadable,
//! `4` invalid workbook, `5` invalid sheet data, `6` prompt error.

use clap::{Args, Parser, Subcommand};
use i18n_import::config::{
    DEFAULT_IGNORED_COLS, DEFAULT_INDEX_EXT, DEFAULT_OUT_DIR, DEFAULT_SHEET_NAMES, DEFAULT_SOURCE,
};
use i18n_import::logs::{log_success, log_warning};
use i18n_import::{
    normalize_args, preview_import, run_import, split_list, AssumeYes, Confirm, ImportConfig,
    ImportError, ImportOutcome, ImportResult, StdinConfirm,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "i18n-import", version)]
#[command(about = "Import locale messages from a spreadsheet into JSON resource files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Spreadsheet (.xlsx, .xls, .ods), CSV file, or directory of CSV sheets
    #[arg(long, env = "I18N_SOURCE", default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Output folder
    #[arg(long, env = "I18N_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Sheets to import, separated by commas
    #[arg(long, env = "I18N_SHEET_NAMES", default_value = DEFAULT_SHEET_NAMES)]
    sheet_names: String,

    /// Columns to drop, separated by commas
    #[arg(long, env = "I18N_IGNORED_COLS", default_value = DEFAULT_IGNORED_COLS)]
    ignored_cols: String,

    /// Duplicate key handling: first, last or error
    #[arg(long, env = "I18N_ON_CONFLICT", default_value = "first")]
    on_conflict: String,
}

impl SourceArgs {
    fn into_config(self, extra: BTreeMap<String, String>) -> ImportResult<ImportConfig> {
        let config = ImportConfig {
            source: self.source,
            out_dir: self.out_dir,
            sheet_names: split_list(&self.sheet_names),
            ignored_cols: split_list(&self.ignored_cols),
            on_conflict: self.on_conflict.parse()?,
            extra,
            ..ImportConfig::default()
        };
        Ok(config.resolved()?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read the spreadsheet, confirm, and write locale files
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,

        /// Extension of generated index files
        #[arg(long, default_value = DEFAULT_INDEX_EXT)]
        index_ext: String,
    },

    /// Compile the spreadsheet and print the locale tree as JSON
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> ImportResult<()> {
    let normalized = normalize_args(std::env::args())?;
    let cli = Cli::parse_from(normalized.args);

    match cli.command {
        Commands::Run { source, yes, index_ext } => {
            let config = ImportConfig { index_ext, ..source.into_config(normalized.extra)? };
            cmd_run(&config, yes).await
        }
        Commands::Preview { source, output } => {
            let config = source.into_config(normalized.extra)?;
            cmd_preview(&config, output.as_deref())
        }
    }
}

async fn cmd_run(config: &ImportConfig, yes: bool) -> ImportResult<()> {
    let mut confirm: Box<dyn Confirm> = if yes { Box::new(AssumeYes) } else { Box::new(StdinConfirm) };

    match run_import(config, confirm.as_mut()).await? {
        // Already reported by the pipeline
        ImportOutcome::Cancelled { .. } => {}
        ImportOutcome::Completed { report, elapsed, .. } => {
            let count = report.succeeded();
            log_success(format!(
                "Imported {} {} in {:.2}ms.",
                count,
                if count == 1 { "file" } else { "files" },
                elapsed.as_secs_f64() * 1000.0
            ));
            if report.failed() > 0 {
                log_warning(format!("{} of {} files could not be written", report.failed(), report.total()));
            }
        }
    }
    Ok(())
}

fn cmd_preview(config: &ImportConfig, output: Option<&Path>) -> ImportResult<()> {
    let report = preview_import(config)?;
    eprintln!(
        "✅ {} rows, locales: {}",
        report.total_rows,
        report.messages.locale_names().join(", ")
    );

    let json = serde_json::to_string_pretty(&report.messages)
        .map_err(|e| ImportError::Output(e.into()))?;
    write_output(&json, output)
}

fn write_output(content: &str, path: Option<&Path>) -> ImportResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(ImportError::Output)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
