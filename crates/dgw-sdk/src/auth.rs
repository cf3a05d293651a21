//! Bearer token verification.
//!
//! The gateway consumes tokens; it never issues them. [`Hs256Verifier`]
//! checks compact JWS tokens signed with HMAC-SHA256 and turns their claims
//! into a [`Principal`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use dgw_types::Principal;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{GatewayError, GatewayResult};

type HmacSha256 = Hmac<Sha256>;

/// Turns a credential into a verified principal.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return its principal, or `Unauthorized`.
    fn verify(&self, token: &str) -> GatewayResult<Principal>;

    /// Verify the credential carried in an `Authorization` header value.
    fn authenticate(&self, authorization: &str) -> GatewayResult<Principal> {
        self.verify(bearer_token(authorization)?)
    }
}

/// Extract the token from `Bearer <token>`.
pub fn bearer_token(authorization: &str) -> GatewayResult<&str> {
    match authorization.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(GatewayError::Unauthorized("missing bearer".into())),
    }
}

/// HS256 verifier with a shared secret and a required audience.
#[derive(Clone)]
pub struct Hs256Verifier {
    secret: Option<Vec<u8>>,
    audience: String,
}

impl std::fmt::Debug for Hs256Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256Verifier")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// A claim that may be a single string or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    aud: Option<OneOrMany>,
    #[serde(default)]
    exp: Option<f64>,
    #[serde(default)]
    scope: Option<OneOrMany>,
    #[serde(default)]
    purpose: Option<String>,
}

impl Hs256Verifier {
    pub fn new(secret: Option<impl Into<Vec<u8>>>, audience: impl Into<String>) -> Self {
        Self {
            secret: secret.map(Into::into),
            audience: audience.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.audience.clone())
    }

    /// Verify `token` as of `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> GatewayResult<Principal> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| GatewayError::ServerConfig("jwt secret is not configured".into()))?;

        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unauthorized("malformed token"));
        };

        let header: Header = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(unauthorized(format!("unsupported algorithm {}", header.alg)));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| unauthorized("malformed signature"))?;
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| GatewayError::ServerConfig(e.to_string()))?;
        mac.update(token[..header_and_payload_len(token)].as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| unauthorized("signature mismatch"))?;

        let claims: Claims = decode_segment(payload)?;
        let audience_ok = match &claims.aud {
            Some(OneOrMany::One(aud)) => *aud == self.audience,
            Some(OneOrMany::Many(auds)) => auds.iter().any(|a| *a == self.audience),
            None => false,
        };
        if !audience_ok {
            return Err(unauthorized("invalid audience"));
        }
        match claims.exp {
            Some(exp) if exp > now as f64 => {}
            Some(_) => return Err(unauthorized("token expired")),
            None => return Err(unauthorized("missing exp")),
        }

        let scopes: Vec<String> = match claims.scope {
            Some(OneOrMany::One(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(OneOrMany::Many(list)) => list,
            None => Vec::new(),
        };
        let subject = claims.sub.unwrap_or_else(|| "unknown".into());
        let mut principal = Principal::new(subject, scopes);
        principal.purpose = claims.purpose;
        debug!(subject = %principal.subject, scopes = principal.scopes.len(), "token verified");
        Ok(principal)
    }
}

impl TokenVerifier for Hs256Verifier {
    fn verify(&self, token: &str) -> GatewayResult<Principal> {
        self.verify_at(token, Utc::now().timestamp())
    }
}

fn unauthorized(message: impl Into<String>) -> GatewayError {
    GatewayError::Unauthorized(format!("invalid token: {}", message.into()))
}

fn header_and_payload_len(token: &str) -> usize {
    token.rfind('.').unwrap_or(token.len())
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> GatewayResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| unauthorized("malformed segment"))?;
    serde_json::from_slice(&bytes).map_err(|e| unauthorized(e.to_string()))
}
