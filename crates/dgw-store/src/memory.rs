use std::collections::HashMap;
use std::sync::RwLock;

use dgw_types::ObjectHash;

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Canonical bytes are held behind a
/// `RwLock` for safe concurrent access.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectHash, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Replace the stored bytes for `hash`, bypassing content addressing.
    ///
    /// Only useful for simulating on-disk corruption in tests.
    pub fn overwrite_raw(&self, hash: ObjectHash, bytes: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(hash, bytes);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read_raw(&self, hash: &ObjectHash) -> StoreResult<Option<Vec<u8>>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(hash).cloned())
    }

    fn write_raw(&self, hash: &ObjectHash, bytes: &[u8]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(*hash).or_insert_with(|| bytes.to_vec());
        Ok(())
    }

    fn exists(&self, hash: &ObjectHash) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(hash))
    }

    fn list(&self) -> StoreResult<Vec<ObjectHash>> {
        let map = self.objects.read().expect("lock poisoned");
        let mut hashes: Vec<ObjectHash> = map.keys().copied().collect();
        hashes.sort();
        Ok(hashes)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::traits::verify_document;
    use dgw_types::Document;
    use serde_json::json;

    fn entity(id: &str) -> Document {
        Document::from_value(json!({
            "envelope": {"kind": "EntityRecord", "privacy": {"classification": "internal"}},
            "context": {"snapshot_as_of": "2024-03-01"},
            "body": {"entity_id": id}
        }))
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Put / Get
    // -----------------------------------------------------------------------

    #[test]
    fn put_then_get_returns_committed_document() {
        let store = InMemoryObjectStore::new();
        let hash = store.put(&entity("e1")).unwrap();
        let doc = store.get(&hash).unwrap();
        assert_eq!(doc.integrity_hash(), Some(hash.to_string().as_str()));
        assert!(verify_document(&doc));
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let h1 = store.put(&entity("e1")).unwrap();
        let h2 = store.put(&entity("e1")).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_gets_different_hashes() {
        let store = InMemoryObjectStore::new();
        let h1 = store.put(&entity("e1")).unwrap();
        let h2 = store.put(&entity("e2")).unwrap();
        assert_ne!(h1, h2);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let hash = ObjectHash::from_digest([7; 32]);
        assert!(matches!(store.get(&hash), Err(StoreError::NotFound(h)) if h == hash));
        assert!(!store.exists(&hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_invalid() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(store.get_str("md5:abc"), Err(StoreError::Invalid(_))));
        assert!(matches!(store.get_str("sha256:xyz"), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn undecodable_bytes_are_corrupt() {
        let store = InMemoryObjectStore::new();
        let hash = ObjectHash::from_digest([1; 32]);
        store.overwrite_raw(hash, b"{not json".to_vec());
        assert!(matches!(store.get(&hash), Err(StoreError::Corrupt { .. })));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_duplicate_puts_store_once() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(&entity("shared")).unwrap())
            })
            .collect();
        let hashes: Vec<ObjectHash> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
