//! Schema validation seam.
//!
//! Per-kind JSON schemas are owned outside the gateway. The store only needs
//! a yes/no answer for `(kind, body)`, expressed by [`SchemaValidator`].

use std::collections::BTreeMap;

use serde_json::Value;

/// A body rejected by a validator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SchemaError {
    pub kind: String,
    pub message: String,
}

/// Validates a document body against the schema for its kind.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, kind: &str, body: &Value) -> Result<(), SchemaError>;
}

/// Accepts every body.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _kind: &str, _body: &Value) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Requires the body to be an object carrying non-empty string fields per
/// kind. Kinds without an entry only need an object body.
#[derive(Clone, Debug)]
pub struct RequiredFields {
    fields: BTreeMap<String, Vec<String>>,
}

impl RequiredFields {
    /// No requirements beyond an object body.
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Require `fields` for documents of `kind`.
    pub fn require<I, S>(mut self, kind: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .entry(kind.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }
}

impl Default for RequiredFields {
    /// Entity records need `entity_id`; activity records need `activity_id`.
    fn default() -> Self {
        Self::empty()
            .require("EntityRecord", ["entity_id"])
            .require("ActivityRecord", ["activity_id"])
    }
}

impl SchemaValidator for RequiredFields {
    fn validate(&self, kind: &str, body: &Value) -> Result<(), SchemaError> {
        let fail = |message: String| SchemaError {
            kind: kind.to_string(),
            message,
        };
        let body = body
            .as_object()
            .ok_or_else(|| fail("body must be an object".into()))?;
        for field in self.fields.get(kind).into_iter().flatten() {
            match body.get(field).and_then(Value::as_str) {
                Some(s) if !s.is_empty() => {}
                _ => return Err(fail(format!("missing required string field {field:?}"))),
            }
        }
        Ok(())
    }
}
