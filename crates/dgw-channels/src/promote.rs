use chrono::{DateTime, SecondsFormat, Utc};
use dgw_manifest::{Manifest, ManifestRef, ManifestStore};
use dgw_types::validate_segment;
use tracing::{debug, info};

use crate::error::{ChannelError, Result};
use crate::etag::etag_for;
use crate::pointer::{ChannelEntry, ChannelState, CurrentPointer, PointerRecord};
use crate::registry::ChannelRegistry;

/// Result of a promotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionOutcome {
    /// The new current pointer.
    pub record: PointerRecord,
    /// The channel after promotion.
    pub state: ChannelState,
    /// Whether the manifest id changed (and history grew).
    pub changed: bool,
}

/// Apply a promotion to a stored channel entry.
///
/// 1. A legacy entry or legacy `current` is normalized first.
/// 2. If the normalized current points at a different manifest id it is
///    appended to history.
/// 3. Re-promoting the same id never touches history.
/// 4. `current` becomes `record`.
pub fn apply_promotion(entry: Option<ChannelEntry>, record: PointerRecord) -> PromotionOutcome {
    let mut state = entry.map(ChannelEntry::normalize).unwrap_or_default();
    let previous = state.current.take().map(CurrentPointer::normalize);
    let changed = match previous {
        Some(prev) if prev.manifest_id != record.manifest_id => {
            state.history.push(prev);
            true
        }
        Some(_) => false,
        None => true,
    };
    state.current = Some(CurrentPointer::Structured(record.clone()));
    PromotionOutcome {
        record,
        state,
        changed,
    }
}

/// Promotes manifests onto channels.
pub struct Promoter<'a> {
    registry: &'a dyn ChannelRegistry,
    manifests: &'a dyn ManifestStore,
}

impl<'a> Promoter<'a> {
    pub fn new(registry: &'a dyn ChannelRegistry, manifests: &'a dyn ManifestStore) -> Self {
        Self {
            registry,
            manifests,
        }
    }

    /// Find the manifest a reference names.
    ///
    /// An id must already be stored. An inline manifest is stored first if
    /// its id is new; if the id is taken, the stored manifest is used.
    pub fn resolve(&self, dataset: &str, manifest_ref: ManifestRef) -> Result<Manifest> {
        match manifest_ref {
            ManifestRef::Id(id) => Ok(self.manifests.get(dataset, &id)?),
            ManifestRef::Inline(manifest) => {
                let mut manifest = *manifest;
                if manifest.dataset.is_empty() {
                    manifest.dataset = dataset.to_string();
                } else if manifest.dataset != dataset {
                    return Err(ChannelError::Invalid(format!(
                        "inline manifest belongs to dataset {:?}, not {dataset:?}",
                        manifest.dataset
                    )));
                }
                if self.manifests.create(&manifest)? {
                    debug!(dataset, manifest_id = %manifest.manifest_id, "inline manifest stored");
                    return Ok(manifest);
                }
                Ok(self.manifests.get(dataset, &manifest.manifest_id)?)
            }
        }
    }

    /// Promote a manifest to `(dataset, channel)`.
    pub fn promote(
        &self,
        dataset: &str,
        channel: &str,
        manifest_ref: ManifestRef,
        promoted_by: &str,
        at: DateTime<Utc>,
    ) -> Result<PromotionOutcome> {
        validate_segment("dataset", dataset)?;
        validate_segment("channel", channel)?;
        let manifest = self.resolve(dataset, manifest_ref)?;
        let record = PointerRecord {
            manifest_id: manifest.manifest_id.clone(),
            etag: etag_for(&manifest),
            promoted_at: Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            promoted_by: promoted_by.to_string(),
            origin: Default::default(),
        };

        let mut outcome = None;
        self.registry.transact(&mut |doc| {
            let applied = apply_promotion(doc.entry(dataset, channel).cloned(), record.clone());
            doc.set(dataset, channel, applied.state.clone());
            outcome = Some(applied);
            Ok(())
        })?;
        let outcome = outcome.ok_or_else(|| {
            ChannelError::Invalid("registry update did not run".into())
        })?;

        info!(
            dataset,
            channel,
            manifest_id = %outcome.record.manifest_id,
            etag = %outcome.record.etag,
            changed = outcome.changed,
            history = outcome.state.history.len(),
            "channel promoted"
        );
        Ok(outcome)
    }

    /// The manifest a channel currently points at.
    pub fn resolve_channel(&self, dataset: &str, channel: &str) -> Result<Manifest> {
        let current = self
            .registry
            .channel(dataset, channel)?
            .and_then(|state| state.current_record())
            .ok_or_else(|| ChannelError::NotFound {
                dataset: dataset.to_string(),
                channel: channel.to_string(),
            })?;
        Ok(self.manifests.get(dataset, &current.manifest_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryChannelRegistry;
    use crate::pointer::Origin;
    use crate::registry::RegistryDocument;
    use chrono::TimeZone;
    use dgw_manifest::{InMemoryManifestStore, ManifestEntry, ManifestError};
    use dgw_types::ObjectHash;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn record(id: &str) -> PointerRecord {
        PointerRecord {
            manifest_id: id.into(),
            etag: format!("etag-{id}"),
            promoted_at: Some("2024-03-01T00:00:00Z".into()),
            promoted_by: "user:a".into(),
            origin: Origin::Promotion,
        }
    }

    fn stored(store: &InMemoryManifestStore, id: &str) {
        let m = Manifest::new(
            "core",
            id,
            "2024-03-01T00:00:00Z",
            vec![ManifestEntry {
                kind: "EntityRecord".into(),
                logical_id: "e1".into(),
                date: "2024-03-01".into(),
                object: ObjectHash::from_digest([1; 32]),
            }],
        )
        .seal()
        .unwrap();
        store.create(&m).unwrap();
    }

    // -----------------------------------------------------------------------
    // apply_promotion
    // -----------------------------------------------------------------------

    #[test]
    fn first_promotion_has_empty_history() {
        let out = apply_promotion(None, record("m1"));
        assert!(out.changed);
        assert!(out.state.history.is_empty());
        assert_eq!(out.state.current_record(), Some(record("m1")));
    }

    #[test]
    fn same_id_is_idempotent_for_history() {
        let first = apply_promotion(None, record("m1"));
        let mut again = record("m1");
        again.promoted_at = Some("2024-04-01T00:00:00Z".into());
        let second = apply_promotion(Some(ChannelEntry::State(first.state)), again.clone());
        assert!(!second.changed);
        assert!(second.state.history.is_empty());
        assert_eq!(second.state.current_record(), Some(again));
    }

    #[test]
    fn new_id_pushes_previous_to_history() {
        let a = apply_promotion(None, record("A"));
        let b = apply_promotion(Some(ChannelEntry::State(a.state)), record("B"));
        assert_eq!(b.state.history, vec![record("A")]);
        assert_eq!(b.state.current_record().unwrap().manifest_id, "B");
    }

    #[test]
    fn legacy_bare_entry_is_normalized_into_history() {
        let out = apply_promotion(Some(ChannelEntry::Bare("old".into())), record("new"));
        assert_eq!(out.state.history, vec![PointerRecord::legacy("old")]);
        assert_eq!(out.state.history[0].origin, Origin::Legacy);
    }

    #[test]
    fn legacy_current_with_same_id_is_replaced_without_history() {
        let entry = ChannelEntry::State(ChannelState {
            current: Some(CurrentPointer::Legacy("m1".into())),
            history: Vec::new(),
        });
        let out = apply_promotion(Some(entry), record("m1"));
        assert!(out.state.history.is_empty());
        assert_eq!(out.state.current_record(), Some(record("m1")));
    }

    // -----------------------------------------------------------------------
    // Promoter
    // -----------------------------------------------------------------------

    #[test]
    fn promote_by_id_uses_integrity_etag() {
        let registry = InMemoryChannelRegistry::new();
        let manifests = InMemoryManifestStore::new();
        stored(&manifests, "m1");
        let promoter = Promoter::new(&registry, &manifests);

        let out = promoter
            .promote("core", "prod", ManifestRef::Id("m1".into()), "user:a", at())
            .unwrap();
        let m = manifests.get("core", "m1").unwrap();
        assert_eq!(out.record.etag, m.integrity_hash().unwrap());
        assert_eq!(out.record.promoted_at.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(out.record.promoted_by, "user:a");
    }

    #[test]
    fn promote_unknown_id_is_not_found() {
        let registry = InMemoryChannelRegistry::new();
        let manifests = InMemoryManifestStore::new();
        let promoter = Promoter::new(&registry, &manifests);
        let err = promoter
            .promote("core", "prod", ManifestRef::Id("ghost".into()), "u", at())
            .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Manifest(ManifestError::NotFound { .. })
        ));
        assert!(registry.load().unwrap().0.is_empty());
    }

    #[test]
    fn inline_manifest_is_persisted_once() {
        let registry = InMemoryChannelRegistry::new();
        let manifests = InMemoryManifestStore::new();
        let promoter = Promoter::new(&registry, &manifests);
        let inline = ManifestRef::from_value(json!({
            "manifest_id": "snap",
            "objects": [{"hash": ObjectHash::from_digest([7; 32]).to_string()}]
        }))
        .unwrap();

        let out = promoter.promote("core", "staging", inline, "u", at()).unwrap();
        assert_eq!(out.record.etag, ObjectHash::from_digest([7; 32]).to_string());
        let persisted = manifests.get("core", "snap").unwrap();
        assert_eq!(persisted.dataset, "core");
    }

    #[test]
    fn inline_manifest_for_other_dataset_is_invalid() {
        let registry = InMemoryChannelRegistry::new();
        let manifests = InMemoryManifestStore::new();
        let promoter = Promoter::new(&registry, &manifests);
        let inline =
            ManifestRef::from_value(json!({"manifest_id": "x", "dataset": "aux"})).unwrap();
        assert!(matches!(
            promoter.promote("core", "prod", inline, "u", at()),
            Err(ChannelError::Invalid(_))
        ));
    }

    #[test]
    fn promote_normalizes_legacy_registry() {
        let mut doc = RegistryDocument::default();
        doc.0
            .entry("core".into())
            .or_default()
            .insert("prod".into(), ChannelEntry::Bare("m0".into()));
        let registry = InMemoryChannelRegistry::with_document(doc);
        let manifests = InMemoryManifestStore::new();
        stored(&manifests, "m1");
        let promoter = Promoter::new(&registry, &manifests);

        let out = promoter
            .promote("core", "prod", ManifestRef::Id("m1".into()), "u", at())
            .unwrap();
        assert_eq!(out.state.history.len(), 1);
        assert_eq!(out.state.history[0].etag, "legacy:m0");
        assert_eq!(registry.channel("core", "prod").unwrap(), Some(out.state));
    }

    #[test]
    fn resolve_channel_returns_current_manifest() {
        let registry = InMemoryChannelRegistry::new();
        let manifests = InMemoryManifestStore::new();
        stored(&manifests, "m1");
        let promoter = Promoter::new(&registry, &manifests);
        promoter
            .promote("core", "prod", ManifestRef::Id("m1".into()), "u", at())
            .unwrap();
        assert_eq!(promoter.resolve_channel("core", "prod").unwrap().manifest_id, "m1");
        assert!(matches!(
            promoter.resolve_channel("core", "dev"),
            Err(ChannelError::NotFound { .. })
        ));
    }
}
