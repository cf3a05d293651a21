use std::fmt;

use dgw_crypto::{verify_commitment, Verification};
use dgw_refs::{RefError, RefStore};
use dgw_store::{ObjectStore, SchemaValidator};
use dgw_types::{Document, ObjectHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::GatewayResult;

/// What is wrong with one stored item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// Hash mismatch, or a missing or malformed integrity field.
    Integrity,
    /// The body fails validation for its kind.
    Schema,
    /// The file cannot be read or decoded.
    Corrupt,
    /// A ref names a malformed hash or a missing object.
    DanglingRef,
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integrity => "integrity",
            Self::Schema => "schema",
            Self::Corrupt => "corrupt",
            Self::DanglingRef => "dangling_ref",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub kind: DefectKind,
    /// Repository-relative path of the offending file.
    pub location: String,
    pub detail: String,
}

/// Outcome of a repository-wide check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub objects: usize,
    pub refs: usize,
    pub defects: Vec<Defect>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.defects.is_empty()
    }

    fn push(&mut self, kind: DefectKind, location: impl Into<String>, detail: impl Into<String>) {
        let defect = Defect {
            kind,
            location: location.into(),
            detail: detail.into(),
        };
        warn!(kind = %defect.kind, location = %defect.location, detail = %defect.detail, "defect");
        self.defects.push(defect);
    }
}

fn object_location(hash: &ObjectHash) -> String {
    format!("objects/{}/{}.json", hash.shard(), hash.to_hex())
}

/// Check every object and ref, collecting all defects.
pub(crate) fn verify_repository(
    objects: &dyn ObjectStore,
    refs: &dyn RefStore,
    schema: &dyn SchemaValidator,
) -> GatewayResult<VerificationReport> {
    let mut report = VerificationReport::default();

    for hash in objects.list()? {
        report.objects += 1;
        let location = object_location(&hash);
        let Some(bytes) = objects.read_raw(&hash)? else {
            report.push(DefectKind::Corrupt, location, "listed but unreadable");
            continue;
        };
        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                report.push(DefectKind::Corrupt, location, e.to_string());
                continue;
            }
        };

        match verify_commitment(&value) {
            Ok(Verification::Valid(computed)) if computed == hash => {}
            Ok(Verification::Valid(computed)) => report.push(
                DefectKind::Integrity,
                location.as_str(),
                format!("stored under {hash} but commits to {computed}"),
            ),
            Ok(Verification::Mismatch { claimed, computed }) => report.push(
                DefectKind::Integrity,
                location.as_str(),
                format!("hash mismatch: claimed={claimed} computed={computed}"),
            ),
            Ok(Verification::Missing) => report.push(
                DefectKind::Integrity,
                location.as_str(),
                "missing or invalid envelope.integrity.hash",
            ),
            Err(e) => report.push(DefectKind::Integrity, location.as_str(), e.to_string()),
        }

        let Ok(document) = Document::from_value(value) else {
            continue;
        };
        if let Some(kind) = document.kind() {
            let empty = Value::Object(Map::new());
            if let Err(e) = schema.validate(kind, document.body().unwrap_or(&empty)) {
                report.push(DefectKind::Schema, location, e.to_string());
            }
        }
    }

    for key in refs.keys()? {
        report.refs += 1;
        let location = key.relative_path().display().to_string();
        match refs.read(&key) {
            Ok(Some(reference)) => {
                if !objects.exists(&reference.object)? {
                    report.push(
                        DefectKind::DanglingRef,
                        location,
                        format!("object not found: {}", reference.object),
                    );
                }
            }
            Ok(None) => report.push(DefectKind::Corrupt, location, "listed but unreadable"),
            Err(RefError::Malformed { reason, .. }) => {
                report.push(DefectKind::DanglingRef, location, format!("invalid object field: {reason}"))
            }
            Err(e) => report.push(DefectKind::Corrupt, location, e.to_string()),
        }
    }

    info!(
        objects = report.objects,
        refs = report.refs,
        defects = report.defects.len(),
        "repository verified"
    );
    Ok(report)
}
