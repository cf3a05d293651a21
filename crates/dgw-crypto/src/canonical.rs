//! Canonical JSON encoding for deterministic hashing.
//!
//! The canonical form of a JSON value is:
//! - object keys sorted by their UTF-8 bytes, at every nesting level
//! - no whitespace between tokens
//! - strings emitted as raw UTF-8; only `"`, `\` and control characters are
//!   escaped
//! - numbers in their shortest `serde_json` form
//!
//! Two structurally equal values always produce identical bytes, whatever the
//! key order of the input they were parsed from.

use std::io::{self, Write};

use serde_json::Value;

/// Encode a JSON value to canonical bytes.
pub fn canonicalize(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    // Writing into a Vec cannot fail.
    let _ = write_canonical(&mut buf, value);
    buf
}

/// Stream the canonical encoding of `value` into `out`.
pub fn write_canonical<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::Null => out.write_all(b"null"),
        Value::Bool(true) => out.write_all(b"true"),
        Value::Bool(false) => out.write_all(b"false"),
        Value::Number(n) => write!(out, "{n}"),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.write_all(b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write_canonical(out, item)?;
            }
            out.write_all(b"]")
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            out.write_all(b"{")?;
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write_string(out, key)?;
                out.write_all(b":")?;
                write_canonical(out, item)?;
            }
            out.write_all(b"}")
        }
    }
}

fn write_string<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *out, s).map_err(io::Error::from)
}
