use dgw_crypto::{commit, verify_commitment, Verification};
use dgw_types::{validate_segment, ObjectHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ManifestError, Result};

/// One logical id in a manifest, pinned to the object its current ref held
/// at build time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: String,
    pub logical_id: String,
    pub date: String,
    pub object: ObjectHash,
}

/// Flattened object reference, `{"hash": "sha256:..."}`.
///
/// Extra fields carried by older manifests are preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub hash: ObjectHash,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<ObjectHash> for ObjectEntry {
    fn from(hash: ObjectHash) -> Self {
        Self {
            hash,
            extra: Map::new(),
        }
    }
}

/// An immutable dataset snapshot.
///
/// Only `manifest_id` is mandatory when decoding, so manifests written by
/// other tools (or supplied inline for promotion) still load. Unknown
/// top-level fields round-trip through `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest_id: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Create an unsealed manifest whose `objects` mirror `entries`.
    pub fn new(
        dataset: impl Into<String>,
        manifest_id: impl Into<String>,
        created_at: impl Into<String>,
        entries: Vec<ManifestEntry>,
    ) -> Self {
        let objects = entries.iter().map(|e| ObjectEntry::from(e.object)).collect();
        Self {
            manifest_id: manifest_id.into(),
            dataset: dataset.into(),
            created_at: Some(created_at.into()),
            entries,
            objects,
            envelope: None,
            extra: Map::new(),
        }
    }

    /// Check that dataset and id are usable as path segments.
    pub fn validate_names(&self) -> Result<()> {
        validate_segment("dataset", &self.dataset)?;
        validate_segment("manifest id", &self.manifest_id)?;
        Ok(())
    }

    /// Commit the manifest: write its hash into `envelope.integrity.hash`.
    pub fn seal(self) -> Result<Self> {
        let mut value = self.to_value()?;
        commit(&mut value)?;
        Self::from_value(value)
    }

    /// Recompute the commitment, if the manifest claims one.
    pub fn verify(&self) -> Result<Verification> {
        Ok(verify_commitment(&self.to_value()?)?)
    }

    /// The claimed `envelope.integrity.hash`, if it is a string.
    pub fn integrity_hash(&self) -> Option<&str> {
        self.envelope
            .as_ref()?
            .get("integrity")?
            .get("hash")?
            .as_str()
    }

    /// The first object the manifest lists: `objects[0]`, falling back to
    /// `entries[0]`.
    pub fn first_object(&self) -> Option<ObjectHash> {
        self.objects
            .first()
            .map(|o| o.hash)
            .or_else(|| self.entries.first().map(|e| e.object))
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ManifestError::Invalid(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ManifestError::Invalid(e.to_string()))
    }
}

/// The manifest a promotion targets.
#[derive(Clone, Debug, PartialEq)]
pub enum ManifestRef {
    /// An existing manifest, by id.
    Id(String),
    /// A manifest supplied in full; persisted first if its id is new.
    Inline(Box<Manifest>),
}

impl ManifestRef {
    /// Interpret a caller-supplied JSON value.
    ///
    /// Strings are ids; objects must decode as a manifest with a
    /// `manifest_id`. Anything else is invalid.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(id) => {
                validate_segment("manifest id", &id)?;
                Ok(Self::Id(id))
            }
            Value::Object(map) => {
                if !map.get("manifest_id").is_some_and(Value::is_string) {
                    return Err(ManifestError::Invalid(
                        "inline manifest must include manifest_id".into(),
                    ));
                }
                let manifest = Manifest::from_value(Value::Object(map))?;
                validate_segment("manifest id", &manifest.manifest_id)?;
                Ok(Self::Inline(Box::new(manifest)))
            }
            _ => Err(ManifestError::Invalid("manifest must be id or object".into())),
        }
    }

    pub fn manifest_id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Inline(m) => &m.manifest_id,
        }
    }
}
