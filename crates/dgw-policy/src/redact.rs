//! View projections.

use dgw_types::{Document, View};
use serde_json::{Map, Value};

/// Remove `envelope.owner` and `body.links`. Everything else passes through.
pub fn redact(document: &Document) -> Document {
    let mut out = document.clone();
    let map = out.as_map_mut();
    if let Some(Value::Object(envelope)) = map.get_mut("envelope") {
        envelope.remove("owner");
    }
    if let Some(Value::Object(body)) = map.get_mut("body") {
        body.remove("links");
    }
    out
}

/// Render a document in the given view.
pub fn apply_view(document: &Document, view: View) -> Document {
    match view {
        View::Full => document.clone(),
        View::Redacted => redact(document),
    }
}

/// Keep only the fields named by dot paths such as `body.entity_id`.
///
/// The output preserves nesting. Paths that do not resolve are skipped; if
/// none resolve, the input is returned unchanged.
pub fn project_fields<S: AsRef<str>>(document: &Document, paths: &[S]) -> Document {
    let mut out = Map::new();
    for path in paths {
        let path = path.as_ref().trim();
        if path.is_empty() {
            continue;
        }
        let Some(value) = document.field(path) else {
            continue;
        };
        insert_path(&mut out, path, value.clone());
    }
    if out.is_empty() {
        document.clone()
    } else {
        Document::from_value(Value::Object(out)).unwrap_or_else(|_| document.clone())
    }
}

fn insert_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    let mut parts = path.split('.').peekable();
    let mut cursor = out;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            cursor.insert(part.to_string(), value);
            return;
        }
        let slot = cursor
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else { return };
        cursor = next;
    }
}
