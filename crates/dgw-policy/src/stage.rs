use std::time::Duration;

use dgw_types::{Classification, Principal, View};

use crate::config::PolicyConfig;
use crate::error::{ForbiddenReason, PolicyError};

// ---------------------------------------------------------------------------
// AccessRequest
// ---------------------------------------------------------------------------

/// A read request as seen by the access pipeline.
#[derive(Clone, Debug)]
pub struct AccessRequest<'a> {
    /// Who is reading.
    pub principal: &'a Principal,
    /// Classification of the object being read.
    pub classification: Classification,
    /// View asked for, if any.
    pub requested_view: Option<View>,
}

// ---------------------------------------------------------------------------
// StageDecision / StageResult
// ---------------------------------------------------------------------------

/// The outcome of a single stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// Proceed to the next stage.
    Pass,
    /// Deny the request.
    Deny(PolicyError),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Recorded result from a completed stage.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated when the stage denied the request.
    pub reason: Option<ForbiddenReason>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// AccessContext
// ---------------------------------------------------------------------------

/// State shared by the stages of one evaluation.
pub struct AccessContext<'a> {
    pub config: &'a PolicyConfig,
    /// Effective view, once a stage has resolved it.
    pub view: Option<View>,
    /// Results from stages that have already run.
    pub previous_stages: Vec<StageResult>,
}

impl<'a> AccessContext<'a> {
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self {
            config,
            view: None,
            previous_stages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessStage trait
// ---------------------------------------------------------------------------

/// A single check in the access pipeline.
///
/// Stages run in order; the first denial ends the evaluation. The trait is
/// object-safe so stages can be stored as `Box<dyn AccessStage>`.
pub trait AccessStage: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, request: &AccessRequest<'_>, context: &mut AccessContext<'_>)
        -> StageDecision;
}
