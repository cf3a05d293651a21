use serde::{Deserialize, Serialize};

/// How a pointer record came to exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Written by a promotion.
    #[default]
    Promotion,
    /// Synthesized from a legacy pointer.
    Legacy,
}

/// A structured channel pointer.
///
/// Older records used the short names `id` and `by` and may lack `etag` or
/// the promoter; they are accepted on read and completed by
/// [`normalize`](Self::normalize). The long names are always written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerRecord {
    #[serde(alias = "id")]
    pub manifest_id: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub promoted_at: Option<String>,
    #[serde(default, alias = "by")]
    pub promoted_by: String,
    #[serde(default)]
    pub origin: Origin,
}

impl PointerRecord {
    /// The structured form of a legacy bare-id pointer.
    pub fn legacy(manifest_id: impl Into<String>) -> Self {
        let manifest_id = manifest_id.into();
        Self {
            etag: legacy_etag(&manifest_id),
            manifest_id,
            promoted_at: None,
            promoted_by: LEGACY_PROMOTER.into(),
            origin: Origin::Legacy,
        }
    }

    /// Fill in the markers an older structured record may be missing.
    pub fn normalize(mut self) -> Self {
        if self.etag.is_empty() {
            self.etag = legacy_etag(&self.manifest_id);
            self.origin = Origin::Legacy;
        }
        if self.promoted_by.is_empty() {
            self.promoted_by = LEGACY_PROMOTER.into();
        }
        self
    }
}

const LEGACY_PROMOTER: &str = "legacy";

fn legacy_etag(manifest_id: &str) -> String {
    format!("legacy:{manifest_id}")
}

/// `current` as stored: structured, or a legacy bare manifest id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrentPointer {
    Structured(PointerRecord),
    Legacy(String),
}

impl CurrentPointer {
    pub fn manifest_id(&self) -> &str {
        match self {
            Self::Structured(r) => &r.manifest_id,
            Self::Legacy(id) => id,
        }
    }

    pub fn normalize(self) -> PointerRecord {
        match self {
            Self::Structured(r) => r.normalize(),
            Self::Legacy(id) => PointerRecord::legacy(id),
        }
    }
}

/// A channel's pointer and promotion history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentPointer>,
    #[serde(default)]
    pub history: Vec<PointerRecord>,
}

impl ChannelState {
    /// Replace a legacy `current` with its structured form and complete
    /// every record.
    pub fn normalize(self) -> Self {
        Self {
            current: self
                .current
                .map(|c| CurrentPointer::Structured(c.normalize())),
            history: self
                .history
                .into_iter()
                .map(PointerRecord::normalize)
                .collect(),
        }
    }

    /// The structured current pointer, if any.
    pub fn current_record(&self) -> Option<PointerRecord> {
        self.current.clone().map(CurrentPointer::normalize)
    }
}

/// A channel as stored in the registry document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelEntry {
    /// Legacy: the whole channel is a bare manifest id.
    Bare(String),
    State(ChannelState),
}

impl ChannelEntry {
    /// Convert any stored form to a normalized [`ChannelState`].
    pub fn normalize(self) -> ChannelState {
        match self {
            Self::Bare(id) => ChannelState {
                current: Some(CurrentPointer::Structured(PointerRecord::legacy(id))),
                history: Vec::new(),
            },
            Self::State(state) => state.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_record_markers() {
        let r = PointerRecord::legacy("m0");
        assert_eq!(r.etag, "legacy:m0");
        assert_eq!(r.promoted_by, "legacy");
        assert_eq!(r.promoted_at, None);
        assert_eq!(r.origin, Origin::Legacy);
    }

    #[test]
    fn short_field_names_are_accepted() {
        let r: PointerRecord = serde_json::from_value(json!({
            "id": "dev-seed",
            "etag": "sha256:abc",
            "promoted_at": "2025-01-01T00:00:00Z",
            "by": "user:a"
        }))
        .unwrap();
        assert_eq!(r.manifest_id, "dev-seed");
        assert_eq!(r.promoted_by, "user:a");
        assert_eq!(r.origin, Origin::Promotion);

        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(out["manifest_id"], json!("dev-seed"));
        assert_eq!(out["promoted_by"], json!("user:a"));
        assert_eq!(out["origin"], json!("promotion"));
    }

    #[test]
    fn entry_forms_decode() {
        let bare: ChannelEntry = serde_json::from_value(json!("m0")).unwrap();
        assert_eq!(bare, ChannelEntry::Bare("m0".into()));

        let empty: ChannelEntry = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, ChannelEntry::State(ChannelState::default()));

        let legacy_current: ChannelEntry =
            serde_json::from_value(json!({"current": "m0"})).unwrap();
        let state = legacy_current.normalize();
        assert_eq!(state.current_record(), Some(PointerRecord::legacy("m0")));
    }

    #[test]
    fn record_without_etag_or_promoter_is_completed() {
        let entry: ChannelEntry = serde_json::from_value(json!({
            "current": {"id": "m0", "promoted_at": "2024-01-01T00:00:00Z", "by": "user:x"},
            "history": [{"manifest_id": "older"}]
        }))
        .unwrap();
        let state = entry.normalize();

        let current = state.current_record().unwrap();
        assert_eq!(current.manifest_id, "m0");
        assert_eq!(current.etag, "legacy:m0");
        assert_eq!(current.promoted_by, "user:x");
        assert_eq!(current.origin, Origin::Legacy);

        assert_eq!(state.history[0].etag, "legacy:older");
        assert_eq!(state.history[0].promoted_by, "legacy");
    }

    #[test]
    fn complete_record_is_unchanged_by_normalize() {
        let r = PointerRecord {
            manifest_id: "m1".into(),
            etag: "sha256:abc".into(),
            promoted_at: None,
            promoted_by: "user:a".into(),
            origin: Origin::Promotion,
        };
        assert_eq!(r.clone().normalize(), r);
    }

    #[test]
    fn bare_entry_normalizes_to_structured_current() {
        let state = ChannelEntry::Bare("m0".into()).normalize();
        assert!(matches!(state.current, Some(CurrentPointer::Structured(_))));
        assert!(state.history.is_empty());
    }
}
