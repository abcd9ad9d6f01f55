//! Per-locale, per-module message trees.
//!
//! ```text
//! Key = "auth.login.title", Module = "common", en = "Sign in"
//!
//!   en ─┬─ common ─── { "auth": { "login": { "title": "Sign in" } } }
//!       └─ errors ─── { ... }
//! ```
//!
//! A key path resolves to exactly one node kind inside a module: a leaf
//! message or a nested mapping. When two rows disagree, the
//! [`ConflictPolicy`] decides. Locales, modules and keys keep the order in
//! which they were first seen, so output is stable between runs.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

use crate::error::ConfigError;

// =============================================================================
// Conflict policy
// =============================================================================

/// What happens when a row writes where another row already wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the existing node. A leaf blocks any deeper key below it.
    #[default]
    FirstWins,
    /// Replace the existing node with the later row's value.
    LastWins,
    /// Refuse the row.
    Error,
}

impl FromStr for ConflictPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first-wins" => Ok(ConflictPolicy::FirstWins),
            "last" | "last-wins" => Ok(ConflictPolicy::LastWins),
            "error" => Ok(ConflictPolicy::Error),
            _ => Err(ConfigError::UnknownConflictPolicy(s.to_string())),
        }
    }
}

// =============================================================================
// Key path
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    #[error("key is empty")]
    Empty,
    #[error("key has an empty segment")]
    EmptySegment,
}

/// A `Key` cell split on `.`. Never empty, no empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(key: &str) -> Result<Self, KeyPathError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(KeyPathError::Empty);
        }

        let segments: Vec<String> = key.split('.').map(String::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(KeyPathError::EmptySegment);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Whether `name` can be used as a single path component under the
/// output directory: not empty, not `.` or `..`, no separators.
pub fn is_path_safe(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

// =============================================================================
// Locale tree
// =============================================================================

/// Messages of one module in one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMessages {
    pub module: String,
    pub messages: Map<String, Value>,
}

/// All modules of one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleMessages {
    pub locale: String,
    pub modules: Vec<ModuleMessages>,
}

impl LocaleMessages {
    pub fn module(&self, module: &str) -> Option<&ModuleMessages> {
        self.modules.iter().find(|m| m.module == module)
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.module.as_str()).collect()
    }
}

/// Finished catalog: locale -> module -> message tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTree {
    locales: Vec<LocaleMessages>,
}

impl LocaleTree {
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn locales(&self) -> &[LocaleMessages] {
        &self.locales
    }

    pub fn locale_names(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.locale.as_str()).collect()
    }

    pub fn locale(&self, locale: &str) -> Option<&LocaleMessages> {
        self.locales.iter().find(|l| l.locale == locale)
    }

    /// Number of `(locale, module)` pairs.
    pub fn module_count(&self) -> usize {
        self.locales.iter().map(|l| l.modules.len()).sum()
    }

    /// Look up a node by dotted key.
    pub fn get(&self, locale: &str, module: &str, key: &str) -> Option<&Value> {
        let messages = &self.locale(locale)?.module(module)?.messages;
        let mut segments = key.split('.');
        let mut node = messages.get(segments.next()?)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    fn module_mut(&mut self, locale: &str, module: &str) -> &mut Map<String, Value> {
        let li = match self.locales.iter().position(|l| l.locale == locale) {
            Some(i) => i,
            None => {
                self.locales.push(LocaleMessages { locale: locale.to_string(), modules: Vec::new() });
                self.locales.len() - 1
            }
        };
        let modules = &mut self.locales[li].modules;

        let mi = match modules.iter().position(|m| m.module == module) {
            Some(i) => i,
            None => {
                modules.push(ModuleMessages { module: module.to_string(), messages: Map::new() });
                modules.len() - 1
            }
        };
        &mut modules[mi].messages
    }
}

impl Serialize for ModuleMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages.serialize(serializer)
    }
}

impl Serialize for LocaleMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for module in &self.modules {
            map.serialize_entry(&module.module, module)?;
        }
        map.end()
    }
}

impl Serialize for LocaleTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.locales.len()))?;
        for locale in &self.locales {
            map.serialize_entry(&locale.locale, locale)?;
        }
        map.end()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Result of a single [`CatalogBuilder::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New leaf written.
    Inserted,
    /// An existing node was in the way and was kept.
    Kept,
    /// An existing node was in the way and was overwritten.
    Replaced,
    /// An existing node was in the way and the write was refused.
    Rejected,
}

/// Accumulates rows into a [`LocaleTree`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    policy: ConflictPolicy,
    tree: LocaleTree,
}

impl CatalogBuilder {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy, tree: LocaleTree::default() }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Place `message` at `key` inside `locale`/`module`.
    ///
    /// A rejected write leaves the tree untouched: conflicts are only found
    /// on nodes that already existed, and nothing is created before them.
    pub fn insert(&mut self, locale: &str, module: &str, key: &KeyPath, message: &str) -> InsertOutcome {
        let policy = self.policy;
        let root = self.tree.module_mut(locale, module);
        insert_path(root, key.segments(), message, policy)
    }

    pub fn tree(&self) -> &LocaleTree {
        &self.tree
    }

    pub fn finalize(self) -> LocaleTree {
        self.tree
    }
}

fn insert_path(
    root: &mut Map<String, Value>,
    segments: &[String],
    message: &str,
    policy: ConflictPolicy,
) -> InsertOutcome {
    let Some((last, parents)) = segments.split_last() else {
        return InsertOutcome::Kept;
    };

    let mut outcome = InsertOutcome::Inserted;
    let mut node = root;

    for segment in parents {
        let child = node
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));

        if !child.is_object() {
            match policy {
                ConflictPolicy::FirstWins => return InsertOutcome::Kept,
                ConflictPolicy::Error => return InsertOutcome::Rejected,
                ConflictPolicy::LastWins => {
                    *child = Value::Object(Map::new());
                    outcome = InsertOutcome::Replaced;
                }
            }
        }

        node = match child.as_object_mut() {
            Some(map) => map,
            None => return outcome,
        };
    }

    if let Some(existing) = node.get_mut(last) {
        return match policy {
            ConflictPolicy::FirstWins => InsertOutcome::Kept,
            ConflictPolicy::Error => InsertOutcome::Rejected,
            ConflictPolicy::LastWins => {
                *existing = Value::String(message.to_string());
                InsertOutcome::Replaced
            }
        };
    }

    node.insert(last.clone(), Value::String(message.to_string()));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> KeyPath {
        KeyPath::parse(k).unwrap()
    }

    #[test]
    fn test_nested_key_hierarchy() {
        let mut builder = CatalogBuilder::default();
        builder.insert("en", "common", &key("a.b.c"), "Hello");
        let tree = builder.finalize();

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({ "en": { "common": { "a": { "b": { "c": "Hello" } } } } })
        );
    }

    #[test]
    fn test_first_leaf_wins_blocks_deeper_keys() {
        let mut builder = CatalogBuilder::new(ConflictPolicy::FirstWins);
        assert_eq!(builder.insert("en", "common", &key("a"), "first"), InsertOutcome::Inserted);
        assert_eq!(builder.insert("en", "common", &key("a.b"), "second"), InsertOutcome::Kept);
        assert_eq!(builder.insert("en", "common", &key("a"), "third"), InsertOutcome::Kept);

        let tree = builder.finalize();
        assert_eq!(tree.get("en", "common", "a"), Some(&json!("first")));
    }

    #[test]
    fn test_first_wins_keeps_mapping_over_later_leaf() {
        let mut builder = CatalogBuilder::default();
        builder.insert("en", "common", &key("a.b"), "deep");
        assert_eq!(builder.insert("en", "common", &key("a"), "flat"), InsertOutcome::Kept);
        assert_eq!(builder.tree().get("en", "common", "a.b"), Some(&json!("deep")));
    }

    #[test]
    fn test_last_wins_replaces() {
        let mut builder = CatalogBuilder::new(ConflictPolicy::LastWins);
        builder.insert("en", "common", &key("a"), "first");
        assert_eq!(builder.insert("en", "common", &key("a.b"), "second"), InsertOutcome::Replaced);
        assert_eq!(builder.tree().get("en", "common", "a.b"), Some(&json!("second")));

        assert_eq!(builder.insert("en", "common", &key("a"), "third"), InsertOutcome::Replaced);
        assert_eq!(builder.tree().get("en", "common", "a"), Some(&json!("third")));
    }

    #[test]
    fn test_error_policy_rejects_without_mutation() {
        let mut builder = CatalogBuilder::new(ConflictPolicy::Error);
        builder.insert("en", "common", &key("a"), "first");
        let before = builder.tree().clone();

        assert_eq!(builder.insert("en", "common", &key("a.b.c"), "x"), InsertOutcome::Rejected);
        assert_eq!(builder.tree(), &before);
    }

    #[test]
    fn test_order_is_first_seen() {
        let mut builder = CatalogBuilder::default();
        builder.insert("ja", "errors", &key("z"), "1");
        builder.insert("en", "common", &key("b"), "2");
        builder.insert("ja", "common", &key("a"), "3");
        builder.insert("ja", "errors", &key("y"), "4");
        let tree = builder.finalize();

        assert_eq!(tree.locale_names(), vec!["ja", "en"]);
        assert_eq!(tree.locale("ja").unwrap().module_names(), vec!["errors", "common"]);
        assert_eq!(tree.module_count(), 3);

        let errors = serde_json::to_string(&tree.locale("ja").unwrap().module("errors").unwrap()).unwrap();
        assert_eq!(errors, r#"{"z":"1","y":"4"}"#);
    }

    #[test]
    fn test_key_path_validation() {
        assert_eq!(key("a.b").segments(), &["a".to_string(), "b".to_string()]);
        assert_eq!(key(" a ").to_string(), "a");
        assert_eq!(KeyPath::parse(""), Err(KeyPathError::Empty));
        assert_eq!(KeyPath::parse("   "), Err(KeyPathError::Empty));
        assert_eq!(KeyPath::parse("a..b"), Err(KeyPathError::EmptySegment));
        assert_eq!(KeyPath::parse(".a"), Err(KeyPathError::EmptySegment));
        assert_eq!(KeyPath::parse("a."), Err(KeyPathError::EmptySegment));
    }

    #[test]
    fn test_path_safe_names() {
        assert!(is_path_safe("common"));
        assert!(is_path_safe("zh-CN"));
        assert!(is_path_safe("v1.errors"));
        assert!(!is_path_safe(""));
        assert!(!is_path_safe(".."));
        assert!(!is_path_safe("../x"));
        assert!(!is_path_safe("a/b"));
        assert!(!is_path_safe("a\\b"));
    }

    #[test]
    fn test_conflict_policy_from_str() {
        assert_eq!("first".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::FirstWins);
        assert_eq!("Last".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::LastWins);
        assert_eq!("error".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Error);
        assert!("newest".parse::<ConflictPolicy>().is_err());
    }
}
