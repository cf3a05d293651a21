//! The [`RefStore`] trait defining the reference storage interface.

use crate::error::Result;
use crate::types::{Ref, RefKey};

/// Storage backend for dated refs.
///
/// Implementations must be thread-safe (`Send + Sync`). Listing methods
/// return names in ascending byte order so that callers which iterate them
/// produce deterministic output.
pub trait RefStore: Send + Sync {
    /// Read a ref. Returns `Ok(None)` if the key does not exist.
    fn read(&self, key: &RefKey) -> Result<Option<Ref>>;

    /// Write a ref. Returns `Ok(true)` if it was created and `Ok(false)` if
    /// an identical ref already existed.
    fn write(&self, reference: &Ref) -> Result<bool>;

    /// All namespaces that contain at least one logical id.
    fn namespaces(&self) -> Result<Vec<String>>;

    /// All logical ids in a namespace.
    fn logical_ids(&self, namespace: &str) -> Result<Vec<String>>;

    /// All dates recorded for a logical id.
    fn dates(&self, namespace: &str, logical_id: &str) -> Result<Vec<String>>;

    /// The current ref of a logical id: the one with the greatest date.
    fn latest(&self, namespace: &str, logical_id: &str) -> Result<Option<Ref>> {
        let Some(date) = self.dates(namespace, logical_id)?.into_iter().max() else {
            return Ok(None);
        };
        let key = RefKey::new(namespace, logical_id, date)?;
        self.read(&key)
    }

    /// Every ref key in the index, in (namespace, logical id, date) order.
    fn keys(&self) -> Result<Vec<RefKey>> {
        let mut keys = Vec::new();
        for ns in self.namespaces()? {
            for id in self.logical_ids(&ns)? {
                for date in self.dates(&ns, &id)? {
                    keys.push(RefKey::new(ns.as_str(), id.as_str(), date)?);
                }
            }
        }
        Ok(keys)
    }
}
