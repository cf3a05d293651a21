use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Access policy configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Purposes a principal may declare. A principal without a purpose is
    /// not checked against this list.
    pub allowed_purposes: BTreeSet<String>,
    /// Scope that unlocks `restricted` objects. `None` denies them to
    /// everyone.
    pub restricted_scope: Option<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_purposes: ["analysis", "planning"]
                .into_iter()
                .map(String::from)
                .collect(),
            restricted_scope: None,
        }
    }
}

impl PolicyConfig {
    pub fn purpose_allowed(&self, purpose: &str) -> bool {
        self.allowed_purposes.contains(purpose)
    }
}
