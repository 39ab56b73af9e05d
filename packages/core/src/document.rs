//! The application document and dotted-path resolution.
//!
//! A [`Document`] is the parsed Standard Job Application record. Its content
//! is a plain [`serde_json::Value`], which already is the tagged union the
//! engine needs: null, bool, number, string, array, or an object whose key
//! order is preserved. Traversal with [`resolve`] is therefore an exhaustive
//! `match`, never duck-typed property access.
//!
//! ```text
//! resolve(doc, "applicant_info.name.first_name")  → Some("Ada")
//! resolve(doc, "work_experience.0.title")         → Some("Engineer")
//! resolve(doc, "applicant_info.missing")          → None
//! ```

use serde_json::Value;

use crate::error::LoadError;

/// The `""` default returned by [`resolve_or`] for absent paths.
pub static EMPTY: Value = Value::String(String::new());

/// A parsed application document.
///
/// Immutable once parsed. The loader hands it back in the
/// [`LoadReport`](crate::LoadReport) and keeps no reference of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse UTF-8 JSON text into a document.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| LoadError::ParseFailure(e.to_string()))?;
        Ok(Self { root })
    }

    /// Wrap an already-built value.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// The declared format version stored under the top-level `key`, if it
    /// is a string.
    pub fn version(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    /// Resolve `path` against this document; see [`resolve`].
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve(&self.root, path)
    }
}

/// Walk `value` along a `.`-separated `path`.
///
/// Returns `None` as soon as a segment is missing or the current node cannot
/// be indexed, and when the final value is `null`. Objects are indexed by
/// key; arrays by a segment that parses as an unsigned integer.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => return None,
        };
    }
    match current {
        Value::Null => None,
        found => Some(found),
    }
}

/// [`resolve`], substituting `default` for anything absent.
pub fn resolve_or<'a>(value: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    resolve(value, path).unwrap_or(default)
}

/// The text a form field receives when `value` is assigned to it.
///
/// Null becomes the empty string, arrays join their elements with `,`, and
/// objects are written as compact JSON. Integral floats lose their fraction
/// (`50000.0` is written `50000`), as a browser would write them.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(text_of).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Truthiness used for checkbox fields.
///
/// `null`, `false`, zero, NaN and `""` are false; every other value,
/// including an empty array or object, is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// --- tests -------------------------------------------------------------------
