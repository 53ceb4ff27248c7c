//! # Config resolver: load, merge, expand, fan out.
//!
//! [`resolve`] turns a config path into an ordered, never-empty list of
//! [`Target`]s:
//!
//! 1. read the JSON file (a missing file at the default path means
//!    "defaults only" — not an error);
//! 2. the top level is one target object or an array of target objects;
//! 3. each entry is shallow-merged over [`default_value`] (user keys win);
//! 4. a recursive walk substitutes `{key}` in every string leaf, scoped to the
//!    merged record's top-level string fields;
//! 5. the expanded value is deserialized into a typed [`Target`].
//!
//! ## Substitution rules
//! - **Single-pass**: substituted values are never re-expanded, so a value
//!   that *produces* `{something}` stays as produced.
//! - Unresolved placeholders are left verbatim (no error).
//! - Only string leaves are touched; mappings and sequences are traversed,
//!   numbers/booleans are left alone.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde_json::Value;

use super::defaults::default_value;
use super::target::Target;
use crate::error::ConfigError;

/// Resolves the user config at `path` into one or more build targets.
///
/// Never returns an empty list: with no config file at the default path the
/// result is a single default-only target. Fails only if a present file does
/// not read, parse, or has the wrong shape.
pub fn resolve(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let raw = if path.exists() {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str::<Value>(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        Value::Object(serde_json::Map::new())
    };

    let entries = match raw {
        Value::Object(map) => vec![Value::Object(map)],
        Value::Array(items) => {
            if items.is_empty() || items.iter().any(|i| !i.is_object()) {
                return Err(ConfigError::Shape {
                    path: path.to_path_buf(),
                });
            }
            items
        }
        _ => {
            return Err(ConfigError::Shape {
                path: path.to_path_buf(),
            })
        }
    };

    entries
        .into_iter()
        .map(|entry| resolve_entry(entry, path))
        .collect()
}

/// Resolves a single raw target entry: merge over defaults, expand, type.
fn resolve_entry(user: Value, path: &Path) -> Result<Target, ConfigError> {
    let mut merged = default_value();
    if let (Value::Object(base), Value::Object(over)) = (&mut merged, user) {
        for (k, v) in over {
            base.insert(k, v);
        }
    }

    let scope = top_level_strings(&merged);
    expand(&mut merged, &scope);

    serde_json::from_value(merged).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Collects the top-level string fields of the merged record.
///
/// Values are taken as-is (pre-substitution); this is what makes the
/// expansion single-pass rather than fixed-point.
fn top_level_strings(merged: &Value) -> HashMap<String, String> {
    let mut scope = HashMap::new();
    if let Value::Object(map) = merged {
        for (k, v) in map {
            if let Value::String(s) = v {
                scope.insert(k.clone(), s.clone());
            }
        }
    }
    scope
}

/// Recursively substitutes `{key}` placeholders in every string leaf.
fn expand(value: &mut Value, scope: &HashMap<String, String>) {
    // Placeholder keys mirror config field names.
    let re = Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid placeholder regex");

    fn walk(value: &mut Value, scope: &HashMap<String, String>, re: &Regex) {
        match value {
            Value::String(s) => {
                let replaced = re.replace_all(s, |caps: &regex::Captures<'_>| {
                    match scope.get(&caps[1]) {
                        Some(v) => v.clone(),
                        // Unresolved placeholders stay verbatim.
                        None => caps[0].to_string(),
                    }
                });
                if let std::borrow::Cow::Owned(new) = replaced {
                    *s = new;
                }
            }
            Value::Object(map) => {
                for (_, v) in map.iter_mut() {
                    walk(v, scope, re);
                }
            }
            Value::Array(items) => {
                for v in items.iter_mut() {
                    walk(v, scope, re);
                }
            }
            _ => {}
        }
    }

    walk(value, scope, &re);
}
