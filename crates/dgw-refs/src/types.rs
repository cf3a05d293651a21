//! Core reference types.

use std::fmt;
use std::path::PathBuf;

use dgw_types::{validate_segment, ObjectHash, TypeError};
use serde::{Deserialize, Serialize};

use crate::error::{RefError, Result};

/// Well-known namespaces.
pub mod namespace {
    /// Entity records, keyed by `body.entity_id`.
    pub const ENTITY: &str = "entity";
    /// Activity records, keyed by `body.activity_id`.
    pub const ACTIVITY: &str = "activity";
    /// Every other kind, under the single logical id `object`.
    pub const OBJECT: &str = "object";
}

/// The document kind a namespace's refs are listed under in manifests.
///
/// Only namespaces with a kind take part in manifest builds.
pub fn kind_for_namespace(ns: &str) -> Option<&'static str> {
    match ns {
        namespace::ENTITY => Some("EntityRecord"),
        namespace::ACTIVITY => Some("ActivityRecord"),
        _ => None,
    }
}

/// The namespace a document of `kind` is published under.
pub fn namespace_for_kind(kind: &str) -> &'static str {
    match kind {
        "EntityRecord" => namespace::ENTITY,
        "ActivityRecord" => namespace::ACTIVITY,
        _ => namespace::OBJECT,
    }
}

/// Address of a ref: `(namespace, logical_id, date)`.
///
/// Every component is validated as a single path segment on construction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefKey {
    namespace: String,
    logical_id: String,
    date: String,
}

impl RefKey {
    pub fn new(
        namespace: impl Into<String>,
        logical_id: impl Into<String>,
        date: impl Into<String>,
    ) -> std::result::Result<Self, TypeError> {
        let key = Self {
            namespace: namespace.into(),
            logical_id: logical_id.into(),
            date: date.into(),
        };
        validate_segment("namespace", &key.namespace)?;
        validate_segment("logical id", &key.logical_id)?;
        validate_segment("date", &key.date)?;
        Ok(key)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Path relative to the repository root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from("refs")
            .join(&self.namespace)
            .join(&self.logical_id)
            .join(format!("{}.json", self.date))
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.logical_id, self.date)
    }
}

/// On-disk form of a ref: `{"object": "sha256:..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefRecord {
    pub object: String,
}

impl RefRecord {
    /// Validate the stored hash.
    pub fn resolve(self, key: RefKey) -> Result<Ref> {
        match ObjectHash::parse(&self.object) {
            Ok(object) => Ok(Ref { key, object }),
            Err(e) => Err(RefError::Malformed {
                key,
                reason: e.to_string(),
            }),
        }
    }
}

/// A resolved ref.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ref {
    pub key: RefKey,
    pub object: ObjectHash,
}

impl Ref {
    pub fn new(key: RefKey, object: ObjectHash) -> Self {
        Self { key, object }
    }

    pub fn record(&self) -> RefRecord {
        RefRecord {
            object: self.object.to_string(),
        }
    }
}
