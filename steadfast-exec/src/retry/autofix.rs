use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use steadfast_core::{Action, CandidateLocator, ErrorCategory, ErrorClassification};
use tracing::{debug, warn};

use crate::learning::{LearningContext, LearningEngine, SuggestionSource};

/// What a hook may change for the next pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassAdjustments {
    pub call_timeout: Duration,
    /// Tried ahead of the authored candidates.
    pub extra_candidates: Vec<CandidateLocator>,
}

pub struct AutoFixRequest<'a> {
    pub action: &'a Action,
    pub website: &'a str,
    pub task_type: &'a str,
    pub classification: &'a ErrorClassification,
    /// Every locator tried so far for this action.
    pub tried: &'a [String],
}

#[derive(Debug, thiserror::Error)]
#[error("auto-fix {hook} failed: {message}")]
pub struct AutoFixError {
    pub hook: &'static str,
    pub message: String,
}

/// Runs between two passes when the last failure is auto-fixable.
#[async_trait]
pub trait AutoFixHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_to(&self, classification: &ErrorClassification) -> bool;

    /// Returns a note describing the fix, or `None` when there was nothing to do.
    async fn apply(
        &self,
        req: &AutoFixRequest<'_>,
        adj: &mut PassAdjustments,
    ) -> Result<Option<String>, AutoFixError>;
}

/// Multiplies the per-call timeout, up to a ceiling.
pub struct WidenTimeout {
    pub factor: f64,
    pub max: Duration,
}

#[async_trait]
impl AutoFixHook for WidenTimeout {
    fn name(&self) -> &'static str {
        "widen-timeout"
    }

    fn applies_to(&self, c: &ErrorClassification) -> bool {
        matches!(
            c.category,
            ErrorCategory::Timeout | ErrorCategory::ElementNotInteractive
        )
    }

    async fn apply(
        &self,
        _req: &AutoFixRequest<'_>,
        adj: &mut PassAdjustments,
    ) -> Result<Option<String>, AutoFixError> {
        if !self.factor.is_finite() || self.factor <= 1.0 {
            return Err(AutoFixError {
                hook: self.name(),
                message: format!("widening factor {} must be greater than 1", self.factor),
            });
        }
        let widened = adj.call_timeout.mul_f64(self.factor).min(self.max);
        if widened <= adj.call_timeout {
            return Ok(None);
        }
        adj.call_timeout = widened;
        Ok(Some(format!("call timeout widened to {}ms", widened.as_millis())))
    }
}

/// Puts the best untried locator learned for this same action at the front of
/// the next pass. Cold-start guesses are never used.
pub struct AlternateCandidate {
    pub learning: Arc<LearningEngine>,
    pub min_confidence: f64,
}

#[async_trait]
impl AutoFixHook for AlternateCandidate {
    fn name(&self) -> &'static str {
        "alternate-candidate"
    }

    fn applies_to(&self, c: &ErrorClassification) -> bool {
        c.category == ErrorCategory::SelectorNotFound
    }

    async fn apply(
        &self,
        req: &AutoFixRequest<'_>,
        adj: &mut PassAdjustments,
    ) -> Result<Option<String>, AutoFixError> {
        if req.action.target().is_none() {
            return Ok(None);
        }
        let ctx = LearningContext::new()
            .with_hint(req.action.id())
            .for_action(req.action.id())
            .excluding(req.tried.iter().cloned());
        let s = self
            .learning
            .best_candidate(req.task_type, req.website, &ctx)
            .await;
        if s.source != SuggestionSource::Learned {
            return Ok(None);
        }
        if s.confidence < self.min_confidence {
            debug!(locator = %s.locator, confidence = s.confidence, "learned alternate below threshold");
            return Ok(None);
        }
        if req.tried.contains(&s.locator) || adj.extra_candidates.iter().any(|c| c.locator == s.locator) {
            return Ok(None);
        }
        let note = format!("trying learned locator {} (confidence {:.2})", s.locator, s.confidence);
        adj.extra_candidates
            .push(CandidateLocator::new(s.locator, s.kind, s.confidence));
        Ok(Some(note))
    }
}

/// Runs every applicable hook in order. Failures are logged and skipped.
pub async fn run_auto_fix(
    hooks: &[Arc<dyn AutoFixHook>],
    req: &AutoFixRequest<'_>,
    adj: &mut PassAdjustments,
) -> Vec<(&'static str, String)> {
    let mut notes = Vec::new();
    if !req.classification.auto_fixable {
        return notes;
    }
    for hook in hooks.iter().filter(|h| h.applies_to(req.classification)) {
        match hook.apply(req, adj).await {
            Ok(Some(note)) => notes.push((hook.name(), note)),
            Ok(None) => {}
            Err(e) => warn!(action_id = req.action.id(), error = %e, "auto-fix hook failed"),
        }
    }
    notes
}
