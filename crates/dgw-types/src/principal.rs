use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Well-known capability names carried in a principal's scopes.
pub mod scopes {
    /// Read any object in its full form.
    pub const OBJECTS_READ: &str = "objects:read";
    /// Read objects only through the redacted view.
    pub const OBJECTS_READ_REDACTED: &str = "objects:read:redacted";
    /// Publish new objects and refs.
    pub const OBJECTS_WRITE: &str = "objects:write";
    /// Read manifests.
    pub const MANIFESTS_READ: &str = "manifests:read";
    /// Build and persist manifests.
    pub const MANIFESTS_WRITE: &str = "manifests:write";
    /// Promote manifests to channels.
    pub const CHANNELS_PROMOTE: &str = "channels:promote";
}

/// A verified caller.
///
/// Built per request from a verified credential and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier (e.g. `user:alice`).
    pub subject: String,
    /// Capabilities granted to the subject.
    pub scopes: BTreeSet<String>,
    /// Declared purpose of access, if any.
    pub purpose: Option<String>,
}

impl Principal {
    /// Create a principal with the given subject and scopes and no purpose.
    pub fn new<I, S>(subject: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
            purpose: None,
        }
    }

    /// Attach a declared purpose.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Returns `true` if the principal holds the named scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_are_deduplicated() {
        let p = Principal::new("user:a", [scopes::OBJECTS_READ, scopes::OBJECTS_READ]);
        assert_eq!(p.scopes.len(), 1);
        assert!(p.has_scope(scopes::OBJECTS_READ));
        assert!(!p.has_scope(scopes::OBJECTS_READ_REDACTED));
    }

    #[test]
    fn purpose_is_optional() {
        let p = Principal::new("user:a", Vec::<String>::new());
        assert!(p.purpose.is_none());
        let p = p.with_purpose("analysis");
        assert_eq!(p.purpose.as_deref(), Some("analysis"));
    }
}
