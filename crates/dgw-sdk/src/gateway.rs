use std::fs;

use chrono::Utc;
use dgw_channels::{
    ChannelError, ChannelRegistry, ChannelState, FsChannelRegistry, InMemoryChannelRegistry,
    Promoter, PromotionOutcome,
};
use dgw_ledger::{AuditEvent, AuditWriter, InMemoryLedger, Ledger, NdjsonLedger};
use dgw_manifest::{
    default_manifest_id, FsManifestStore, InMemoryManifestStore, Manifest, ManifestBuilder,
    ManifestRef, ManifestStore,
};
use dgw_policy::{
    apply_view, project_fields, require_any_scope, require_scope, AccessGate, PolicyConfig,
    PolicyError,
};
use dgw_refs::{
    namespace, namespace_for_kind, FsRefStore, InMemoryRefStore, Ref, RefError, RefKey, RefStore,
};
use dgw_store::{FsObjectStore, InMemoryObjectStore, ObjectStore, RequiredFields, SchemaValidator};
use dgw_types::{scopes, Document, ObjectHash, Principal, View};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::verify::{self, VerificationReport};

/// A governed object read.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectResponse {
    pub hash: ObjectHash,
    /// The document in `view`, after any field projection.
    pub document: Document,
    pub view: View,
    /// The object's integrity hash, when it carries one.
    pub etag: Option<String>,
}

impl ObjectResponse {
    /// Whether an `If-None-Match` value matches this response's etag.
    pub fn not_modified(&self, if_none_match: Option<&str>) -> bool {
        let (Some(etag), Some(header)) = (self.etag.as_deref(), if_none_match) else {
            return false;
        };
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*"
                || candidate.trim_start_matches("W/").trim_matches('"') == etag
        })
    }
}

/// A published object and the ref that points at it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub hash: ObjectHash,
    pub reference: Ref,
    /// `false` when the identical ref already existed.
    pub created: bool,
}

/// The gateway: every governed operation on a repository.
///
/// Reads pass through the access gate, writes through the commitment
/// protocol, and every outcome that matters is appended to the audit ledger.
pub struct Gateway {
    objects: Box<dyn ObjectStore>,
    refs: Box<dyn RefStore>,
    manifests: Box<dyn ManifestStore>,
    channels: Box<dyn ChannelRegistry>,
    ledger: Box<dyn Ledger>,
    schema: Box<dyn SchemaValidator>,
    gate: AccessGate,
}

impl Gateway {
    /// Open the filesystem repository at `config.store_root`, creating the
    /// root directory if needed.
    pub fn open(config: &GatewayConfig) -> GatewayResult<Self> {
        let root = &config.store_root;
        fs::create_dir_all(root).map_err(|e| {
            GatewayError::ServerConfig(format!("cannot create {}: {e}", root.display()))
        })?;
        info!(root = %root.display(), "opening repository");
        Ok(Self {
            objects: Box::new(FsObjectStore::new(root)),
            refs: Box::new(FsRefStore::new(root)),
            manifests: Box::new(FsManifestStore::new(root)),
            channels: Box::new(FsChannelRegistry::new(root)),
            ledger: Box::new(NdjsonLedger::in_root(root)?),
            schema: Box::new(RequiredFields::default()),
            gate: AccessGate::with_default_stages(config.policy.clone()),
        })
    }

    /// A gateway over in-memory backends.
    pub fn in_memory(policy: PolicyConfig) -> Self {
        Self {
            objects: Box::new(InMemoryObjectStore::new()),
            refs: Box::new(InMemoryRefStore::new()),
            manifests: Box::new(InMemoryManifestStore::new()),
            channels: Box::new(InMemoryChannelRegistry::new()),
            ledger: Box::new(InMemoryLedger::new()),
            schema: Box::new(RequiredFields::default()),
            gate: AccessGate::with_default_stages(policy),
        }
    }

    pub fn with_schema_validator(mut self, schema: impl SchemaValidator + 'static) -> Self {
        self.schema = Box::new(schema);
        self
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn refs(&self) -> &dyn RefStore {
        self.refs.as_ref()
    }

    pub fn manifests(&self) -> &dyn ManifestStore {
        self.manifests.as_ref()
    }

    pub fn channels(&self) -> &dyn ChannelRegistry {
        self.channels.as_ref()
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    // ---- Reads ----

    /// Read an object in the view the policy grants, optionally projected
    /// to `fields`.
    ///
    /// Reads never fail on integrity: a stored claim that disagrees with the
    /// address is logged and left to [`verify_repository`](Self::verify_repository).
    pub fn get_object<S: AsRef<str>>(
        &self,
        principal: &Principal,
        hash: &str,
        view: Option<View>,
        fields: &[S],
    ) -> GatewayResult<ObjectResponse> {
        let hash = ObjectHash::parse(hash)?;
        let stored = self.objects.get(&hash)?;
        if let Some(claimed) = stored.integrity_hash() {
            if claimed != hash.to_string() {
                warn!(%hash, claimed, "object claims a different address");
            }
        }

        let decision = self
            .gate
            .authorize(principal, &stored, view)
            .map_err(|e| self.denied(principal, "objects.get", Some(hash.to_string()), e))?;

        let mut document = apply_view(&stored, decision.view);
        if !fields.is_empty() {
            document = project_fields(&document, fields);
        }
        self.audit(
            principal,
            AuditEvent::ObjectRead {
                hash: hash.to_string(),
                requested: view.map(|v| v.to_string()),
                view: decision.view.to_string(),
            },
        )?;
        Ok(ObjectResponse {
            hash,
            etag: stored.integrity_hash().map(str::to_string),
            document,
            view: decision.view,
        })
    }

    /// Read one dated ref. Any authenticated principal may read refs.
    pub fn get_ref(
        &self,
        principal: &Principal,
        namespace: &str,
        logical_id: &str,
        date: &str,
    ) -> GatewayResult<Ref> {
        let key = RefKey::new(namespace, logical_id, date)?;
        let reference = self
            .refs
            .read(&key)?
            .ok_or_else(|| RefError::NotFound(key.clone()))?;
        self.audit(
            principal,
            AuditEvent::RefRead {
                ref_key: key.relative_path().display().to_string(),
            },
        )?;
        Ok(reference)
    }

    /// Read a stored manifest.
    pub fn get_manifest(
        &self,
        principal: &Principal,
        dataset: &str,
        manifest_id: &str,
    ) -> GatewayResult<Manifest> {
        self.require_manifest_read(principal, "manifests.get", dataset)?;
        let manifest = self.manifests.get(dataset, manifest_id)?;
        self.audit(
            principal,
            AuditEvent::ManifestRead {
                dataset: dataset.to_string(),
                manifest: manifest_id.to_string(),
            },
        )?;
        Ok(manifest)
    }

    /// Normalized state of a channel.
    pub fn channel(
        &self,
        principal: &Principal,
        dataset: &str,
        channel: &str,
    ) -> GatewayResult<ChannelState> {
        self.require_manifest_read(principal, "channels.get", dataset)?;
        self.channels
            .channel(dataset, channel)?
            .ok_or_else(|| {
                ChannelError::NotFound {
                    dataset: dataset.to_string(),
                    channel: channel.to_string(),
                }
                .into()
            })
    }

    /// The manifest a channel currently points at.
    pub fn resolve_channel(
        &self,
        principal: &Principal,
        dataset: &str,
        channel: &str,
    ) -> GatewayResult<Manifest> {
        self.require_manifest_read(principal, "channels.resolve", dataset)?;
        let manifest = Promoter::new(self.channels.as_ref(), self.manifests.as_ref())
            .resolve_channel(dataset, channel)?;
        self.audit(
            principal,
            AuditEvent::ManifestRead {
                dataset: dataset.to_string(),
                manifest: manifest.manifest_id.clone(),
            },
        )?;
        Ok(manifest)
    }

    // ---- Writes ----

    /// Commit and store an object, then write its dated ref.
    ///
    /// The ref date is `date`, else `context.snapshot_as_of`, else today.
    pub fn publish(
        &self,
        principal: &Principal,
        document: &Document,
        date: Option<&str>,
    ) -> GatewayResult<Published> {
        require_scope(principal, scopes::OBJECTS_WRITE)
            .map_err(|e| self.denied(principal, "object.write", None, e))?;

        let kind = document.kind().unwrap_or("Object");
        let empty = Value::Object(Map::new());
        self.schema.validate(kind, document.body().unwrap_or(&empty))?;

        let ns = namespace_for_kind(kind);
        let logical_id = match ns {
            namespace::ENTITY => body_str(document, "entity_id").unwrap_or(namespace::ENTITY),
            namespace::ACTIVITY => {
                body_str(document, "activity_id").unwrap_or(namespace::ACTIVITY)
            }
            _ => namespace::OBJECT,
        };
        let date = match date.or_else(|| document.snapshot_as_of()) {
            Some(date) => date.to_string(),
            None => Utc::now().format("%Y-%m-%d").to_string(),
        };
        let key = RefKey::new(ns, logical_id, date)?;

        let hash = self.objects.put(document)?;
        let reference = Ref::new(key, hash);
        let created = self.refs.write(&reference)?;
        info!(hash = %hash, ref_key = %reference.key, created, "object published");

        self.audit(
            principal,
            AuditEvent::ObjectWrite {
                hash: hash.to_string(),
                ref_key: reference.key.relative_path().display().to_string(),
            },
        )?;
        Ok(Published {
            hash,
            reference,
            created,
        })
    }

    /// Snapshot the ref index into a manifest for `dataset`.
    ///
    /// Without an id, one is derived from the current UTC time.
    pub fn build_manifest(
        &self,
        principal: &Principal,
        dataset: &str,
        manifest_id: Option<&str>,
    ) -> GatewayResult<Manifest> {
        require_scope(principal, scopes::MANIFESTS_WRITE)
            .map_err(|e| self.denied(principal, "manifests.build", Some(dataset.to_string()), e))?;
        let now = Utc::now();
        let manifest_id = manifest_id
            .map(str::to_string)
            .unwrap_or_else(|| default_manifest_id(now));
        let manifest = ManifestBuilder::new(self.refs.as_ref()).build_into(
            self.manifests.as_ref(),
            dataset,
            &manifest_id,
            now,
        )?;
        self.audit(
            principal,
            AuditEvent::ManifestBuild {
                dataset: dataset.to_string(),
                manifest: manifest.manifest_id.clone(),
                entries: manifest.entries.len(),
            },
        )?;
        Ok(manifest)
    }

    /// Promote a manifest, given as an id string or an inline manifest
    /// object, to `(dataset, channel)`.
    pub fn promote(
        &self,
        principal: &Principal,
        dataset: &str,
        channel: &str,
        manifest: Value,
    ) -> GatewayResult<PromotionOutcome> {
        let manifest_ref = ManifestRef::from_value(manifest)?;
        self.promote_ref(principal, dataset, channel, manifest_ref)
    }

    pub fn promote_ref(
        &self,
        principal: &Principal,
        dataset: &str,
        channel: &str,
        manifest_ref: ManifestRef,
    ) -> GatewayResult<PromotionOutcome> {
        require_scope(principal, scopes::CHANNELS_PROMOTE).map_err(|e| {
            self.denied(principal, "channels.promote", Some(format!("{dataset}/{channel}")), e)
        })?;
        let outcome = Promoter::new(self.channels.as_ref(), self.manifests.as_ref()).promote(
            dataset,
            channel,
            manifest_ref,
            &principal.subject,
            Utc::now(),
        )?;
        self.audit(
            principal,
            AuditEvent::ChannelPromote {
                dataset: dataset.to_string(),
                channel: channel.to_string(),
                manifest: outcome.record.manifest_id.clone(),
                etag: outcome.record.etag.clone(),
                changed: outcome.changed,
            },
        )?;
        Ok(outcome)
    }

    // ---- Maintenance ----

    /// Check every object and ref, collecting all defects.
    pub fn verify_repository(&self) -> GatewayResult<VerificationReport> {
        verify::verify_repository(
            self.objects.as_ref(),
            self.refs.as_ref(),
            self.schema.as_ref(),
        )
    }

    // ---- Internal ----

    fn require_manifest_read(
        &self,
        principal: &Principal,
        operation: &str,
        target: &str,
    ) -> GatewayResult<()> {
        require_any_scope(
            principal,
            &[
                scopes::MANIFESTS_READ,
                scopes::OBJECTS_READ,
                scopes::OBJECTS_READ_REDACTED,
            ],
        )
        .map_err(|e| self.denied(principal, operation, Some(target.to_string()), e))
    }

    fn audit(&self, principal: &Principal, event: AuditEvent) -> GatewayResult<()> {
        self.ledger.record(Some(&principal.subject), event)?;
        Ok(())
    }

    /// Record a denial and turn it into the error the caller sees.
    fn denied(
        &self,
        principal: &Principal,
        operation: &str,
        target: Option<String>,
        err: PolicyError,
    ) -> GatewayError {
        let event = AuditEvent::AccessDenied {
            operation: operation.to_string(),
            reason: err.reason().to_string(),
            target,
        };
        if let Err(e) = self.ledger.record(Some(&principal.subject), event) {
            warn!(error = %e, "failed to record denial");
        }
        err.into()
    }
}

fn body_str<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document
        .body()?
        .get(field)?
        .as_str()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgw_ledger::AuditReader;
    use dgw_policy::ForbiddenReason;
    use dgw_store::AcceptAll;
    use serde_json::json;

    fn entity(id: &str, classification: &str, date: &str) -> Document {
        Document::from_value(json!({
            "envelope": {
                "kind": "EntityRecord",
                "created_at": "2024-03-01T00:00:00Z",
                "integrity": {"hash": null},
                "privacy": {"classification": classification},
                "owner": {"team": "core"}
            },
            "context": {"snapshot_as_of": date},
            "body": {"entity_id": id, "name": "Acme", "links": ["e2"]}
        }))
        .unwrap()
    }

    fn writer() -> Principal {
        Principal::new(
            "user:writer",
            [
                scopes::OBJECTS_WRITE,
                scopes::MANIFESTS_WRITE,
                scopes::CHANNELS_PROMOTE,
            ],
        )
    }

    fn reader() -> Principal {
        Principal::new("user:reader", [scopes::OBJECTS_READ]).with_purpose("analysis")
    }

    fn redacted_reader() -> Principal {
        Principal::new("user:bot", [scopes::OBJECTS_READ_REDACTED])
    }

    fn gateway() -> Gateway {
        Gateway::in_memory(PolicyConfig::default())
    }

    fn last_event(gw: &Gateway) -> AuditEvent {
        gw.ledger().read_all().unwrap().pop().unwrap().event
    }

    // -----------------------------------------------------------------------
    // Object reads
    // -----------------------------------------------------------------------

    #[test]
    fn full_reader_gets_full_view_with_etag() {
        let gw = gateway();
        let published = gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        let hash = published.hash.to_string();

        let resp = gw.get_object::<&str>(&reader(), &hash, None, &[]).unwrap();
        assert_eq!(resp.view, View::Full);
        assert_eq!(resp.etag.as_deref(), Some(hash.as_str()));
        assert!(resp.document.field("envelope.owner").is_some());
        assert_eq!(
            last_event(&gw),
            AuditEvent::ObjectRead {
                hash: hash.clone(),
                requested: None,
                view: "full".into()
            }
        );
    }

    #[test]
    fn redacted_reader_gets_redacted_view() {
        let gw = gateway();
        let hash = gw
            .publish(&writer(), &entity("e1", "internal", "2024-03-01"), None)
            .unwrap()
            .hash
            .to_string();

        let resp = gw.get_object::<&str>(&redacted_reader(), &hash, None, &[]).unwrap();
        assert_eq!(resp.view, View::Redacted);
        assert!(resp.document.field("envelope.owner").is_none());
        assert!(resp.document.field("body.links").is_none());
        assert_eq!(resp.document.field("body.name"), Some(&json!("Acme")));
    }

    #[test]
    fn requested_view_is_audited_alongside_granted_view() {
        let gw = gateway();
        let hash = gw
            .publish(&writer(), &entity("e1", "internal", "2024-03-01"), None)
            .unwrap()
            .hash
            .to_string();

        let resp = gw
            .get_object::<&str>(&reader(), &hash, Some(View::Redacted), &[])
            .unwrap();
        assert_eq!(resp.view, View::Redacted);
        assert_eq!(
            last_event(&gw),
            AuditEvent::ObjectRead {
                hash,
                requested: Some("redacted".into()),
                view: "redacted".into()
            }
        );
    }

    #[test]
    fn redacted_reader_asking_for_full_is_forbidden_and_audited() {
        let gw = gateway();
        let hash = gw
            .publish(&writer(), &entity("e1", "internal", "2024-03-01"), None)
            .unwrap()
            .hash
            .to_string();

        let err = gw
            .get_object::<&str>(&redacted_reader(), &hash, Some(View::Full), &[])
            .unwrap_err();
        assert_eq!(err.status(), 403);
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::ViewEscalation));
        assert_eq!(
            last_event(&gw),
            AuditEvent::AccessDenied {
                operation: "objects.get".into(),
                reason: "view_escalation".into(),
                target: Some(hash),
            }
        );
    }

    #[test]
    fn restricted_object_is_denied() {
        let gw = gateway();
        let hash = gw
            .publish(&writer(), &entity("e1", "restricted", "2024-03-01"), None)
            .unwrap()
            .hash
            .to_string();
        let err = gw.get_object::<&str>(&reader(), &hash, None, &[]).unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::Restricted));
    }

    #[test]
    fn fields_are_projected_after_the_view() {
        let gw = gateway();
        let hash = gw
            .publish(&writer(), &entity("e1", "internal", "2024-03-01"), None)
            .unwrap()
            .hash
            .to_string();
        let resp = gw
            .get_object(
                &redacted_reader(),
                &hash,
                None,
                &["body.entity_id", "envelope.owner"],
            )
            .unwrap();
        assert_eq!(
            resp.document.into_value(),
            json!({"body": {"entity_id": "e1"}})
        );
    }

    #[test]
    fn bad_and_unknown_hashes() {
        let gw = gateway();
        let err = gw.get_object::<&str>(&reader(), "abc", None, &[]).unwrap_err();
        assert_eq!(err.code(), "bad_request");

        let missing = format!("sha256:{}", "0".repeat(64));
        let err = gw.get_object::<&str>(&reader(), &missing, None, &[]).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn not_modified_matches_etag() {
        let resp = ObjectResponse {
            hash: ObjectHash::from_digest([1; 32]),
            document: Document::default(),
            view: View::Full,
            etag: Some("sha256:aa".into()),
        };
        assert!(resp.not_modified(Some("\"sha256:aa\"")));
        assert!(resp.not_modified(Some("sha256:bb, sha256:aa")));
        assert!(resp.not_modified(Some("*")));
        assert!(!resp.not_modified(Some("sha256:bb")));
        assert!(!resp.not_modified(None));

        let untagged = ObjectResponse { etag: None, ..resp };
        assert!(!untagged.not_modified(Some("*")));
    }

    // -----------------------------------------------------------------------
    // Publishing
    // -----------------------------------------------------------------------

    #[test]
    fn publish_writes_ref_under_snapshot_date() {
        let gw = gateway();
        let published = gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        assert!(published.created);
        assert_eq!(published.reference.key.to_string(), "entity/e1/2024-03-01");

        let reference = gw.get_ref(&reader(), "entity", "e1", "2024-03-01").unwrap();
        assert_eq!(reference.object, published.hash);
        assert_eq!(
            last_event(&gw),
            AuditEvent::RefRead {
                ref_key: "refs/entity/e1/2024-03-01.json".into()
            }
        );
    }

    #[test]
    fn publish_explicit_date_wins_and_republish_is_idempotent() {
        let gw = gateway();
        let doc = entity("e1", "internal", "2024-03-01");
        let first = gw.publish(&writer(), &doc, Some("2024-04-01")).unwrap();
        assert_eq!(first.reference.key.date(), "2024-04-01");
        let again = gw.publish(&writer(), &doc, Some("2024-04-01")).unwrap();
        assert!(!again.created);
        assert_eq!(again.hash, first.hash);
    }

    #[test]
    fn publish_other_kinds_under_object_namespace() {
        let gw = gateway();
        let doc = Document::from_value(json!({
            "envelope": {"kind": "Note"},
            "context": {"snapshot_as_of": "2024-03-01"},
            "body": {"text": "hi"}
        }))
        .unwrap();
        let published = gw.publish(&writer(), &doc, None).unwrap();
        assert_eq!(published.reference.key.to_string(), "object/object/2024-03-01");
    }

    #[test]
    fn publish_without_id_falls_back_to_namespace_name() {
        let gw = gateway().with_schema_validator(AcceptAll);
        let doc = Document::from_value(json!({
            "envelope": {"kind": "ActivityRecord"},
            "body": {}
        }))
        .unwrap();
        let published = gw.publish(&writer(), &doc, Some("2024-03-01")).unwrap();
        assert_eq!(published.reference.key.to_string(), "activity/activity/2024-03-01");
    }

    #[test]
    fn publish_rejects_schema_failures_and_missing_scope() {
        let gw = gateway();
        let doc = Document::from_value(json!({
            "envelope": {"kind": "EntityRecord"},
            "body": {"name": "no id"}
        }))
        .unwrap();
        assert_eq!(
            gw.publish(&writer(), &doc, Some("2024-03-01")).unwrap_err().code(),
            "bad_request"
        );

        let err = gw
            .publish(&reader(), &entity("e1", "internal", "2024-03-01"), None)
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::MissingScope));
    }

    // -----------------------------------------------------------------------
    // Manifests and channels
    // -----------------------------------------------------------------------

    #[test]
    fn build_and_read_manifest() {
        let gw = gateway();
        gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        let built = gw.build_manifest(&writer(), "core", Some("m1")).unwrap();
        assert_eq!(built.entries.len(), 1);
        assert!(built.integrity_hash().is_some());

        let read = gw.get_manifest(&redacted_reader(), "core", "m1").unwrap();
        assert_eq!(read, built);

        let nobody = Principal::new("user:x", Vec::<String>::new());
        let err = gw.get_manifest(&nobody, "core", "m1").unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::MissingScope));
    }

    #[test]
    fn build_without_id_uses_timestamp() {
        let gw = gateway();
        let built = gw.build_manifest(&writer(), "core", None).unwrap();
        assert_eq!(built.manifest_id.len(), "20240301-000000".len());
        assert!(built.entries.is_empty());
    }

    #[test]
    fn promote_by_id_and_inline() {
        let gw = gateway();
        gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        gw.build_manifest(&writer(), "core", Some("m1")).unwrap();

        let outcome = gw.promote(&writer(), "core", "prod", json!("m1")).unwrap();
        assert_eq!(outcome.record.promoted_by, "user:writer");
        assert!(outcome.state.history.is_empty());

        let inline = json!({"manifest_id": "m-inline", "entries": []});
        let outcome = gw.promote(&writer(), "core", "prod", inline).unwrap();
        assert_eq!(outcome.record.manifest_id, "m-inline");
        assert!(outcome.record.etag.starts_with("W/sha256:"));
        assert_eq!(outcome.state.history.len(), 1);

        let state = gw.channel(&reader(), "core", "prod").unwrap();
        assert_eq!(state.history[0].manifest_id, "m1");
        let current = gw.resolve_channel(&reader(), "core", "prod").unwrap();
        assert_eq!(current.manifest_id, "m-inline");
    }

    #[test]
    fn promote_errors() {
        let gw = gateway();
        assert_eq!(
            gw.promote(&writer(), "core", "prod", json!(42)).unwrap_err().code(),
            "bad_request"
        );
        assert_eq!(
            gw.promote(&writer(), "core", "prod", json!({"entries": []}))
                .unwrap_err()
                .code(),
            "bad_request"
        );
        assert_eq!(
            gw.promote(&writer(), "core", "prod", json!("missing")).unwrap_err().code(),
            "not_found"
        );
        assert_eq!(
            gw.promote(&reader(), "core", "prod", json!("m1"))
                .unwrap_err()
                .forbidden_reason(),
            Some(ForbiddenReason::MissingScope)
        );
        assert_eq!(
            gw.channel(&reader(), "core", "prod").unwrap_err().code(),
            "not_found"
        );
    }

    // -----------------------------------------------------------------------
    // Filesystem repository and verification
    // -----------------------------------------------------------------------

    fn open(dir: &std::path::Path) -> Gateway {
        Gateway::open(&GatewayConfig::default().with_store_root(dir)).unwrap()
    }

    #[test]
    fn clean_repository_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let gw = open(dir.path());
        gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        gw.publish(&writer(), &entity("e2", "public", "2024-03-01"), None).unwrap();

        let report = gw.verify_repository().unwrap();
        assert!(report.is_ok(), "{:?}", report.defects);
        assert_eq!(report.objects, 2);
        assert_eq!(report.refs, 2);
        assert!(dir.path().join("ledger.ndjson").exists());
    }

    #[test]
    fn verification_collects_every_defect() {
        let dir = tempfile::tempdir().unwrap();
        {
            let lenient = open(dir.path()).with_schema_validator(AcceptAll);
            let doc = Document::from_value(json!({
                "envelope": {"kind": "EntityRecord"},
                "body": {"name": "no id"}
            }))
            .unwrap();
            lenient.publish(&writer(), &doc, Some("2024-03-01")).unwrap();
        }
        let gw = open(dir.path());
        let tampered = gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        let path = dir
            .path()
            .join(format!("objects/{}/{}.json", tampered.hash.shard(), tampered.hash.to_hex()));
        let text = fs::read_to_string(&path).unwrap().replace("Acme", "Evil");
        fs::write(&path, text).unwrap();

        let bad_ref = dir.path().join("refs/entity/e9");
        fs::create_dir_all(&bad_ref).unwrap();
        fs::write(bad_ref.join("2024-01-01.json"), r#"{"object": "nope"}"#).unwrap();
        fs::write(
            bad_ref.join("2024-01-02.json"),
            format!(r#"{{"object": "sha256:{}"}}"#, "0".repeat(64)),
        )
        .unwrap();

        let report = gw.verify_repository().unwrap();
        let kinds: Vec<_> = report.defects.iter().map(|d| d.kind).collect();
        assert_eq!(report.objects, 2);
        assert_eq!(report.refs, 4);
        assert!(kinds.contains(&crate::verify::DefectKind::Schema));
        assert!(kinds.contains(&crate::verify::DefectKind::Integrity));
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == crate::verify::DefectKind::DanglingRef)
                .count(),
            2
        );

        // Reads do not recompute hashes; the tampered object is still served.
        let resp = gw
            .get_object::<&str>(&reader(), &tampered.hash.to_string(), None, &[])
            .unwrap();
        assert_eq!(resp.document.field("body.name"), Some(&json!("Evil")));
    }

    #[test]
    fn object_stored_under_wrong_address_is_served_and_reported_by_verify() {
        let dir = tempfile::tempdir().unwrap();
        let gw = open(dir.path());
        let a = gw.publish(&writer(), &entity("e1", "internal", "2024-03-01"), None).unwrap();
        let b = gw.publish(&writer(), &entity("e2", "internal", "2024-03-01"), None).unwrap();
        let path_of = |h: &ObjectHash| {
            dir.path()
                .join(format!("objects/{}/{}.json", h.shard(), h.to_hex()))
        };
        fs::copy(path_of(&b.hash), path_of(&a.hash)).unwrap();

        let resp = gw
            .get_object::<&str>(&reader(), &a.hash.to_string(), None, &[])
            .unwrap();
        assert_eq!(resp.document.field("body.entity_id"), Some(&json!("e2")));

        let report = gw.verify_repository().unwrap();
        assert!(report
            .defects
            .iter()
            .any(|d| d.kind == crate::verify::DefectKind::Integrity
                && d.location.contains(&a.hash.to_hex())));
    }
}
