use std::path::{Path, PathBuf};

use dgw_policy::PolicyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "DGW_JWT_SECRET";

/// Gateway configuration, loaded from TOML.
///
/// ```toml
/// store_root = "/srv/dgw"
///
/// [policy]
/// allowed_purposes = ["analysis", "planning"]
/// restricted_scope = "objects:read:restricted"
///
/// [auth]
/// audience = "bnx-data"
/// jwt_secret = "..."
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Repository root holding `objects/`, `refs/`, `manifests/`,
    /// `channels.json` and `ledger.ndjson`.
    pub store_root: PathBuf,
    pub policy: PolicyConfig,
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("data"),
            policy: PolicyConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Token verification settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Required `aud` claim.
    pub audience: String,
    /// HS256 signing secret. Without one, every token check fails with a
    /// server configuration error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            audience: "bnx-data".into(),
            jwt_secret: None,
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> GatewayResult<Self> {
        toml::from_str(text).map_err(|e| GatewayError::ServerConfig(e.to_string()))
    }

    /// Load a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::ServerConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self::from_toml(&text)?.with_env())
    }

    /// Load `path` if given, else start from defaults; then apply environment
    /// overrides.
    pub fn load_or_default(path: Option<&Path>) -> GatewayResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default().with_env()),
        }
    }

    /// Apply `DGW_JWT_SECRET`, if set.
    pub fn with_env(self) -> Self {
        self.with_secret_override(std::env::var(JWT_SECRET_ENV).ok())
    }

    /// Replace the secret when `secret` is non-empty.
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
        self
    }

    pub fn with_store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store_root = root.into();
        self
    }
}
