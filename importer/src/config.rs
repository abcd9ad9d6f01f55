//! Import configuration and flag-name normalization.
//!
//! Flags may be spelled in any hyphen, underscore, space or dot separated
//! form (`--out-dir`, `--out_dir`, `--Out.Dir`) or in camelCase (`--outDir`);
//! they are camelized, matched without regard to case, and
//! mapped back to the canonical kebab spelling before clap parses them.
//! Flags the importer does not know are kept in [`ImportConfig::extra`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::ConflictPolicy;
use crate::error::{ConfigError, ConfigResult};
use crate::logs::log_warning;

pub const DEFAULT_SOURCE: &str = "./i18n/source.xlsx";
pub const DEFAULT_OUT_DIR: &str = "./public/locales";
pub const DEFAULT_SHEET_NAMES: &str = "Locale Messages";
pub const DEFAULT_IGNORED_COLS: &str = "Screen ID, Note, Type, Description";
pub const DEFAULT_INDEX_EXT: &str = "ts";

/// Value flags known to the CLI, by camelized name.
const VALUE_FLAGS: &[(&str, &str)] = &[
    ("source", "source"),
    ("outDir", "out-dir"),
    ("sheetNames", "sheet-names"),
    ("ignoredCols", "ignored-cols"),
    ("onConflict", "on-conflict"),
    ("indexExt", "index-ext"),
    ("output", "output"),
];

/// Switches known to the CLI, by camelized name.
const SWITCH_FLAGS: &[(&str, &str)] = &[("yes", "yes"), ("help", "help"), ("version", "version")];

/// Subcommands of the CLI. An unknown flag never takes one as its value.
const SUBCOMMANDS: &[&str] = &["run", "preview", "help"];

static SEPARATOR_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[-_\s.]+(.)?").ok());

/// Everything a single import run needs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub source: PathBuf,
    pub out_dir: PathBuf,
    /// Sheets to import, in order
    pub sheet_names: Vec<String>,
    /// Columns dropped from every row before classification
    pub ignored_cols: Vec<String>,
    pub on_conflict: ConflictPolicy,
    /// Extension of the generated index files
    pub index_ext: String,
    /// Unrecognized flags, verbatim
    pub extra: BTreeMap<String, String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            sheet_names: split_list(DEFAULT_SHEET_NAMES),
            ignored_cols: split_list(DEFAULT_IGNORED_COLS),
            on_conflict: ConflictPolicy::default(),
            index_ext: DEFAULT_INDEX_EXT.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl ImportConfig {
    /// Resolve relative paths against the current directory.
    pub fn resolved(mut self) -> ConfigResult<Self> {
        let cwd = std::env::current_dir()?;
        if self.source.is_relative() {
            self.source = cwd.join(&self.source);
        }
        if self.out_dir.is_relative() {
            self.out_dir = cwd.join(&self.out_dir);
        }
        Ok(self)
    }
}

/// Convert `out-dir`, `out_dir`, `Out Dir`, `out.dir` or `outDir` to `outDir`.
pub fn camelize(text: &str) -> String {
    let joined = match SEPARATOR_RE.as_ref() {
        Some(re) => re.replace_all(text, |caps: &regex::Captures| {
            caps.get(1).map(|c| c.as_str().to_uppercase()).unwrap_or_default()
        }),
        None => Cow::Borrowed(text),
    };
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Arguments after normalization.
#[derive(Debug, Default, PartialEq)]
pub struct NormalizedArgs {
    /// Arguments to hand to clap, program name included
    pub args: Vec<String>,
    /// Unknown flags and their values, keyed by camelized name
    pub extra: BTreeMap<String, String>,
}

/// Rewrite every `--flag` to its canonical spelling and pull out unknown flags.
pub fn normalize_args<I>(argv: I) -> ConfigResult<NormalizedArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut out = NormalizedArgs::default();
    let mut iter = argv.into_iter().peekable();
    let mut command_seen = false;

    while let Some(arg) = iter.next() {
        if !arg.starts_with("--") || arg == "--" {
            if !out.args.is_empty() && SUBCOMMANDS.contains(&arg.as_str()) {
                command_seen = true;
            }
            out.args.push(arg);
            continue;
        }
        let flag = &arg[2..];

        let (name, inline_value) = match flag.split_once('=') {
            Some((n, v)) => (n, Some(v.to_string())),
            None => (flag, None),
        };
        let key = camelize(name);

        if let Some((_, canonical)) = VALUE_FLAGS.iter().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            out.args.push(format!("--{canonical}"));
            match inline_value {
                Some(v) => out.args.push(v),
                None => {
                    let value = iter.next().ok_or_else(|| ConfigError::MissingValue(canonical.to_string()))?;
                    out.args.push(value);
                }
            }
        } else if let Some((_, canonical)) = SWITCH_FLAGS.iter().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            out.args.push(format!("--{canonical}"));
        } else {
            let value = match inline_value {
                Some(v) => v,
                None => match iter.peek() {
                    Some(next)
                        if !next.starts_with("--")
                            && (command_seen || !SUBCOMMANDS.contains(&next.as_str())) =>
                    {
                        iter.next().unwrap_or_default()
                    }
                    _ => String::new(),
                },
            };
            log_warning(format!("Unknown flag '--{name}' kept as '{key}'"));
            out.extra.insert(key, value);
        }
    }

    Ok(out)
}
