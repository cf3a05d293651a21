use dgw_types::{scopes, Principal, View};

use crate::error::{ForbiddenReason, PolicyError};

/// Decide which view a principal receives.
///
/// - full-read scope: the requested view, defaulting to full
/// - redacted-read only: redacted; an explicit request for full is a view
///   escalation
/// - neither: missing scope
pub fn resolve_view(requested: Option<View>, principal: &Principal) -> Result<View, PolicyError> {
    if principal.has_scope(scopes::OBJECTS_READ) {
        return Ok(requested.unwrap_or_default());
    }
    if principal.has_scope(scopes::OBJECTS_READ_REDACTED) {
        return match requested {
            Some(View::Full) => Err(PolicyError::forbidden(
                ForbiddenReason::ViewEscalation,
                "full view requires objects:read",
            )),
            _ => Ok(View::Redacted),
        };
    }
    Err(PolicyError::forbidden(
        ForbiddenReason::MissingScope,
        format!(
            "missing scope {} or {}",
            scopes::OBJECTS_READ,
            scopes::OBJECTS_READ_REDACTED
        ),
    ))
}

/// Require a single operation scope.
pub fn require_scope(principal: &Principal, scope: &str) -> Result<(), PolicyError> {
    if principal.has_scope(scope) {
        Ok(())
    } else {
        Err(PolicyError::forbidden(
            ForbiddenReason::MissingScope,
            format!("missing scope {scope}"),
        ))
    }
}

/// Require at least one of several scopes.
pub fn require_any_scope(principal: &Principal, any_of: &[&str]) -> Result<(), PolicyError> {
    if any_of.iter().any(|s| principal.has_scope(s)) {
        Ok(())
    } else {
        Err(PolicyError::forbidden(
            ForbiddenReason::MissingScope,
            format!("missing scope {}", any_of.join(" or ")),
        ))
    }
}
