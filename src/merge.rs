//! # Protected Deep Merge
//!
//! Updates are applied by deep-merging a payload into a copy of the stored document.
//! Objects merge key by key; anything else, arrays included, replaces the existing value
//! outright.  A set of dotted paths is protected: the merge never writes them, whatever
//! the payload says, and reports each attempt so callers can surface it.
//!
//! ```rust
//! use worldkeeper::{ProtectedPaths, merge};
//! use serde_json::json;
//!
//! let existing = json!({"_id": "aaaaaaaaaaaaaaaa", "name": "Bilbo", "_stats": {"createdTime": 1}});
//! let update = json!({"_id": "bbbbbbbbbbbbbbbb", "name": "Bilbo Baggins"});
//!
//! let outcome = merge(&existing, &update, &ProtectedPaths::default());
//! assert_eq!(outcome.document["name"], "Bilbo Baggins");
//! assert_eq!(outcome.document["_id"], "aaaaaaaaaaaaaaaa");
//! assert_eq!(outcome.skipped, vec!["_id".to_string()]);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paths protected when no configuration says otherwise.
pub const DEFAULT_PROTECTED_PATHS: &[&str] = &[
    "_id",
    "_stats.createdTime",
    "_stats.coreVersion",
    "_stats.systemId",
    "_stats.systemVersion",
];

/// A set of dotted field paths that updates may never overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectedPaths(BTreeSet<String>);

impl ProtectedPaths {
    /// Builds a set from arbitrary paths.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// Whether `path` itself is protected.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Whether some protected path lies strictly below `path`.
    pub fn guards_descendant_of(&self, path: &str) -> bool {
        self.0
            .iter()
            .any(|p| p.len() > path.len() && p.starts_with(path) && p.as_bytes()[path.len()] == b'.')
    }

    /// Iterates over the protected paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ProtectedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PATHS.iter().copied())
    }
}

/// Result of a merge: the new document and the protected paths the payload tried to write.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The merged document.
    pub document: Value,
    /// Protected paths present in the payload, in the order they were met.
    pub skipped: Vec<String>,
}

/// Deep-merges `update` into a copy of `existing`, leaving protected paths untouched.
pub fn merge(existing: &Value, update: &Value, protected: &ProtectedPaths) -> MergeOutcome {
    let mut skipped = Vec::new();
    let document = match (existing, update) {
        (Value::Object(base), Value::Object(patch)) => {
            Value::Object(merge_object(base, patch, "", protected, &mut skipped))
        }
        (Value::Object(base), _) if !base.is_empty() && !protected.0.is_empty() => {
            skipped.push(String::new());
            existing.clone()
        }
        _ => update.clone(),
    };
    MergeOutcome { document, skipped }
}

fn merge_object(
    base: &Map<String, Value>,
    patch: &Map<String, Value>,
    prefix: &str,
    protected: &ProtectedPaths,
    skipped: &mut Vec<String>,
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, incoming) in patch {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        if protected.contains(&path) {
            skipped.push(path);
            continue;
        }

        let next = match (base.get(key), incoming) {
            (Some(Value::Object(current)), Value::Object(incoming)) => {
                Value::Object(merge_object(current, incoming, &path, protected, skipped))
            }
            (_, Value::Object(incoming)) if protected.guards_descendant_of(&path) => {
                // Nothing to keep below this path yet; merge into an empty object so
                // protected leaves in the payload are still dropped.
                Value::Object(merge_object(&Map::new(), incoming, &path, protected, skipped))
            }
            (Some(Value::Object(_)), _) if protected.guards_descendant_of(&path) => {
                skipped.push(path);
                continue;
            }
            (_, incoming) => incoming.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
