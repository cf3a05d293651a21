//! Etags recorded with channel pointers.
//!
//! Priority:
//! 1. the manifest's own `envelope.integrity.hash`
//! 2. the hash of its first listed object
//! 3. a weak etag derived from the manifest id alone

use dgw_crypto::ContentHasher;
use dgw_manifest::Manifest;

/// Weak etag for a manifest id: `W/sha256:<hex(sha256(id))>`.
pub fn weak_etag(manifest_id: &str) -> String {
    format!("W/{}", ContentHasher::hash(manifest_id.as_bytes()))
}

/// The etag to record when promoting `manifest`.
pub fn etag_for(manifest: &Manifest) -> String {
    if let Some(hash) = manifest.integrity_hash() {
        return hash.to_string();
    }
    if let Some(first) = manifest.first_object() {
        return first.to_string();
    }
    weak_etag(&manifest.manifest_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgw_manifest::ManifestEntry;
    use dgw_types::ObjectHash;

    fn manifest(objects: usize) -> Manifest {
        let entries = (0..objects)
            .map(|i| ManifestEntry {
                kind: "EntityRecord".into(),
                logical_id: format!("e{i}"),
                date: "2024-03-01".into(),
                object: ObjectHash::from_digest([i as u8 + 1; 32]),
            })
            .collect();
        Manifest::new("core", "m1", "2024-03-01T00:00:00Z", entries)
    }

    #[test]
    fn integrity_hash_wins() {
        let m = manifest(2).seal().unwrap();
        assert_eq!(etag_for(&m), m.integrity_hash().unwrap());
    }

    #[test]
    fn first_object_is_second_choice() {
        let m = manifest(2);
        assert_eq!(etag_for(&m), ObjectHash::from_digest([1; 32]).to_string());
    }

    #[test]
    fn weak_fallback_for_empty_unsealed_manifest() {
        let m = manifest(0);
        let etag = etag_for(&m);
        assert!(etag.starts_with("W/sha256:"));
        assert_eq!(etag, weak_etag("m1"));
        assert_eq!(etag.len(), "W/sha256:".len() + 64);
    }
}
