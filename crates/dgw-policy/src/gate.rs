use std::time::{Duration, Instant};

use dgw_types::{Document, Principal, View};
use tracing::{debug, warn};

use crate::config::PolicyConfig;
use crate::error::PolicyError;
use crate::stage::{AccessContext, AccessRequest, AccessStage, StageDecision, StageResult};
use crate::stages::{ClassificationStage, PurposeStage, ScopeStage};

/// A granted read.
#[derive(Clone, Debug)]
pub struct AccessDecision {
    /// The view the principal receives.
    pub view: View,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    pub elapsed: Duration,
}

/// The access gate: a pipeline of stages every object read passes through.
pub struct AccessGate {
    stages: Vec<Box<dyn AccessStage>>,
    config: PolicyConfig,
}

impl AccessGate {
    /// Create a gate with an empty pipeline.
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default pipeline:
    /// Classification -> Scope -> Purpose
    pub fn with_default_stages(config: PolicyConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(ClassificationStage));
        gate.add_stage(Box::new(ScopeStage));
        gate.add_stage(Box::new(PurposeStage));
        gate
    }

    pub fn add_stage(&mut self, stage: Box<dyn AccessStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Decide whether `principal` may read `document`, and in which view.
    ///
    /// The pipeline is fail-fast: the first denying stage ends evaluation
    /// and its error is returned.
    pub fn authorize(
        &self,
        principal: &Principal,
        document: &Document,
        requested_view: Option<View>,
    ) -> Result<AccessDecision, PolicyError> {
        let start = Instant::now();
        let request = AccessRequest {
            principal,
            classification: document.classification(),
            requested_view,
        };
        let mut context = AccessContext::new(&self.config);

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(&request, &mut context);
            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Deny(e) => Some(e.reason()),
                    StageDecision::Pass => None,
                },
                elapsed: stage_start.elapsed(),
            };
            context.previous_stages.push(result);

            if let StageDecision::Deny(err) = decision {
                warn!(
                    subject = %principal.subject,
                    stage = stage.name(),
                    reason = %err.reason(),
                    classification = %request.classification,
                    "read denied"
                );
                return Err(err);
            }
        }

        let view = context
            .view
            .unwrap_or_else(|| requested_view.unwrap_or_default());
        debug!(subject = %principal.subject, view = %view, "read granted");
        Ok(AccessDecision {
            view,
            stage_results: context.previous_stages,
            elapsed: start.elapsed(),
        })
    }
}
