//! Write the locale tree to disk.
//!
//! # Output layout
//!
//! ```text
//! <out-dir>/
//! ├── index.ts            import en from './en'; ...
//! ├── en/
//! │   ├── index.ts        import common from './common.json'; ...
//! │   ├── common.json
//! │   └── errors.json
//! └── ja/
//!     └── ...
//! ```
//!
//! All files are written concurrently. A failed write is logged and
//! reported in the [`EmitReport`]; it never stops the other writes.

use futures::future::join_all;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::{LocaleTree, ModuleMessages};
use crate::logs::{log_error, log_success_indent};

/// What a generated file holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Module { locale: String, module: String },
    LocaleIndex { locale: String },
    RootIndex,
}

/// A file to write.
#[derive(Debug)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub contents: serde_json::Result<String>,
}

/// Outcome of one file write.
#[derive(Debug)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub kind: FileKind,
    pub result: io::Result<()>,
}

impl WriteOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every write of one emit run, in plan order.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub outcomes: Vec<WriteOutcome>,
}

impl EmitReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

/// Module file body: pretty JSON, 2-space indent, trailing newline.
pub fn render_module(module: &ModuleMessages) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(&module.messages)?;
    json.push('\n');
    Ok(json)
}

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "let", "static", "await",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    head_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

/// Turn a module or locale name into a unique import binding.
fn binding_for(name: &str, used: &mut HashSet<String>) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if !is_identifier(&ident) {
        ident.insert(0, '_');
    }

    let mut candidate = ident.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", ident, n);
        n += 1;
    }
    candidate
}

/// Index module importing each entry and exporting them as one object.
///
/// `entries` are `(property name, import path)` pairs.
pub fn render_index(entries: &[(&str, String)]) -> String {
    let mut used = HashSet::new();
    let bindings: Vec<(&str, String, &String)> = entries
        .iter()
        .map(|(name, path)| (*name, binding_for(name, &mut used), path))
        .collect();

    let mut out = String::new();
    for (_, binding, path) in &bindings {
        out.push_str(&format!("import {} from '{}';\n", binding, path));
    }

    if bindings.is_empty() {
        out.push_str("const resources = {};\n");
    } else {
        out.push_str("\nconst resources = {\n");
        for (name, binding, _) in &bindings {
            if *name == binding.as_str() {
                out.push_str(&format!("  {},\n", binding));
            } else if is_identifier(name) {
                out.push_str(&format!("  {}: {},\n", name, binding));
            } else {
                let key = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name));
                out.push_str(&format!("  {}: {},\n", key, binding));
            }
        }
        out.push_str("};\n");
    }

    out.push_str("\nexport default resources;\n");
    out
}

/// Lay out every file of the tree without touching the disk.
pub fn plan_files(tree: &LocaleTree, out_dir: &Path, index_ext: &str) -> Vec<PlannedFile> {
    let index_name = format!("index.{}", index_ext.trim_start_matches('.'));
    let mut files = Vec::new();

    for locale in tree.locales() {
        let locale_dir = out_dir.join(&locale.locale);

        for module in &locale.modules {
            files.push(PlannedFile {
                path: locale_dir.join(format!("{}.json", module.module)),
                kind: FileKind::Module { locale: locale.locale.clone(), module: module.module.clone() },
                contents: render_module(module),
            });
        }

        let entries: Vec<(&str, String)> = locale
            .modules
            .iter()
            .map(|m| (m.module.as_str(), format!("./{}.json", m.module)))
            .collect();
        files.push(PlannedFile {
            path: locale_dir.join(&index_name),
            kind: FileKind::LocaleIndex { locale: locale.locale.clone() },
            contents: Ok(render_index(&entries)),
        });
    }

    let entries: Vec<(&str, String)> = tree
        .locales()
        .iter()
        .map(|l| (l.locale.as_str(), format!("./{}", l.locale)))
        .collect();
    files.push(PlannedFile {
        path: out_dir.join(&index_name),
        kind: FileKind::RootIndex,
        contents: Ok(render_index(&entries)),
    });

    files
}

async fn write_one(file: PlannedFile) -> WriteOutcome {
    let PlannedFile { path, kind, contents } = file;
    let result: io::Result<()> = async {
        let contents = contents.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await
    }
    .await;

    match &result {
        Ok(()) => log_success_indent(format!("Imported {}", path.display()), 1),
        Err(e) => log_error(format!("Failed to write {}: {}", path.display(), e)),
    }

    WriteOutcome { path, kind, result }
}

/// Write all module and index files concurrently and wait for every one.
pub async fn write_files(tree: &LocaleTree, out_dir: &Path, index_ext: &str) -> EmitReport {
    let writes = plan_files(tree, out_dir, index_ext)
        .into_iter()
        .map(write_one);

    EmitReport { outcomes: join_all(writes).await }
}
