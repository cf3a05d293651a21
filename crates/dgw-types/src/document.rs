use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classification::Classification;
use crate::error::TypeError;

/// A JSON document with the `envelope` / `context` / `body` layout.
///
/// The wrapper only guarantees that the top level is an object. Every
/// accessor tolerates missing or mistyped sections and returns `None` (or the
/// documented default) instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TypeError::NotAnObject("document")),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Resolve a dot-separated path such as `body.entity_id`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path)?.as_str()
    }

    /// `envelope.kind`
    pub fn kind(&self) -> Option<&str> {
        self.str_field("envelope.kind")
    }

    /// `envelope.privacy.classification`, defaulting to `internal`.
    pub fn classification(&self) -> Classification {
        self.str_field("envelope.privacy.classification")
            .map(Classification::from_label)
            .unwrap_or_default()
    }

    /// The claimed `envelope.integrity.hash`, if it is a string.
    pub fn integrity_hash(&self) -> Option<&str> {
        self.str_field("envelope.integrity.hash")
    }

    /// `context.snapshot_as_of`
    pub fn snapshot_as_of(&self) -> Option<&str> {
        self.str_field("context.snapshot_as_of")
    }

    /// The `body` section, if present.
    pub fn body(&self) -> Option<&Value> {
        self.0.get("body")
    }
}

impl TryFrom<Value> for Document {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}
