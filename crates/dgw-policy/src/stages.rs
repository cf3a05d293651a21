//! Built-in access stages.

use crate::error::{ForbiddenReason, PolicyError};
use crate::stage::{AccessContext, AccessRequest, AccessStage, StageDecision};
use crate::view::resolve_view;

/// Denies `restricted` objects unless the policy names a restricted scope
/// and the principal holds it.
pub struct ClassificationStage;

impl AccessStage for ClassificationStage {
    fn name(&self) -> &str {
        "classification"
    }

    fn evaluate(&self, request: &AccessRequest<'_>, context: &mut AccessContext<'_>) -> StageDecision {
        if !request.classification.is_restricted() {
            return StageDecision::Pass;
        }
        match &context.config.restricted_scope {
            Some(scope) if request.principal.has_scope(scope) => StageDecision::Pass,
            _ => StageDecision::Deny(PolicyError::forbidden(
                ForbiddenReason::Restricted,
                "object is classified restricted",
            )),
        }
    }
}

/// Resolves the effective view from the principal's read scopes.
pub struct ScopeStage;

impl AccessStage for ScopeStage {
    fn name(&self) -> &str {
        "scope"
    }

    fn evaluate(&self, request: &AccessRequest<'_>, context: &mut AccessContext<'_>) -> StageDecision {
        match resolve_view(request.requested_view, request.principal) {
            Ok(view) => {
                context.view = Some(view);
                StageDecision::Pass
            }
            Err(e) => StageDecision::Deny(e),
        }
    }
}

/// Checks a declared purpose against the allow-list.
pub struct PurposeStage;

impl AccessStage for PurposeStage {
    fn name(&self) -> &str {
        "purpose"
    }

    fn evaluate(&self, request: &AccessRequest<'_>, context: &mut AccessContext<'_>) -> StageDecision {
        match request.principal.purpose.as_deref() {
            Some(purpose) if !context.config.purpose_allowed(purpose) => {
                StageDecision::Deny(PolicyError::forbidden(
                    ForbiddenReason::PurposeDenied,
                    format!("purpose {purpose} denied"),
                ))
            }
            _ => StageDecision::Pass,
        }
    }
}
