use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// What happened. Serialized as the `event` field plus the variant's fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AuditEvent {
    /// An object was published and a ref written for it.
    #[serde(rename = "object.write")]
    ObjectWrite {
        hash: String,
        #[serde(rename = "ref")]
        ref_key: String,
    },

    /// An object was served. `requested` is the view the caller asked for,
    /// `view` the one granted.
    #[serde(rename = "objects.get")]
    ObjectRead {
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requested: Option<String>,
        view: String,
    },

    #[serde(rename = "refs.get")]
    RefRead {
        #[serde(rename = "ref")]
        ref_key: String,
    },

    #[serde(rename = "manifests.get")]
    ManifestRead { dataset: String, manifest: String },

    #[serde(rename = "manifests.build")]
    ManifestBuild {
        dataset: String,
        manifest: String,
        entries: usize,
    },

    #[serde(rename = "channels.promote")]
    ChannelPromote {
        dataset: String,
        channel: String,
        manifest: String,
        etag: String,
        changed: bool,
    },

    /// A request was refused by the access policy.
    #[serde(rename = "access.denied")]
    AccessDenied {
        operation: String,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
}

impl AuditEvent {
    /// The `event` name as written to the ledger.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ObjectWrite { .. } => "object.write",
            Self::ObjectRead { .. } => "objects.get",
            Self::RefRead { .. } => "refs.get",
            Self::ManifestRead { .. } => "manifests.get",
            Self::ManifestBuild { .. } => "manifests.build",
            Self::ChannelPromote { .. } => "channels.promote",
            Self::AccessDenied { .. } => "access.denied",
        }
    }
}

/// One ledger line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 UTC timestamp.
    pub ts: String,
    /// Acting subject, when the operation had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditEntry {
    /// An entry stamped with the current time.
    pub fn now(sub: Option<&str>, event: AuditEvent) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            sub: sub.map(str::to_string),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_is_flattened_with_tag() {
        let entry = AuditEntry {
            ts: "2024-03-01T00:00:00Z".into(),
            sub: Some("user:a".into()),
            event: AuditEvent::ObjectWrite {
                hash: "sha256:00".into(),
                ref_key: "refs/entity/e1/2024-03-01.json".into(),
            },
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "ts": "2024-03-01T00:00:00Z",
                "sub": "user:a",
                "event": "object.write",
                "hash": "sha256:00",
                "ref": "refs/entity/e1/2024-03-01.json"
            })
        );
        let back: AuditEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn names_match_serialized_tags() {
        let events = [
            AuditEvent::RefRead { ref_key: "r".into() },
            AuditEvent::ManifestRead { dataset: "d".into(), manifest: "m".into() },
            AuditEvent::AccessDenied {
                operation: "objects.get".into(),
                reason: "restricted".into(),
                target: None,
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], json!(event.name()));
        }
    }

    #[test]
    fn object_read_records_requested_and_granted_views() {
        let downgraded = AuditEvent::ObjectRead {
            hash: "sha256:00".into(),
            requested: Some("full".into()),
            view: "redacted".into(),
        };
        let value = serde_json::to_value(&downgraded).unwrap();
        assert_eq!(value["requested"], json!("full"));
        assert_eq!(value["view"], json!("redacted"));

        let line = json!({"event": "objects.get", "hash": "sha256:00", "view": "full"});
        let event: AuditEvent = serde_json::from_value(line).unwrap();
        assert_eq!(
            event,
            AuditEvent::ObjectRead {
                hash: "sha256:00".into(),
                requested: None,
                view: "full".into(),
            }
        );
    }

    #[test]
    fn now_stamps_utc() {
        let entry = AuditEntry::now(None, AuditEvent::RefRead { ref_key: "r".into() });
        assert!(entry.ts.ends_with('Z'));
        assert!(entry.sub.is_none());
    }
}
