use steadfast_core::{
    ActionAttempt, ActionKind, CandidateLocator, ErrorClassification, ExecutionContext, Strategy,
};

use crate::driver::DriverError;
use crate::executor::concurrency::LimiterClosed;

/// Telemetry for one executed action.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub action_id: String,
    pub kind: ActionKind,
    pub success: bool,
    /// Precondition failed and the policy said skip.
    pub skipped: bool,
    /// Failed, but the action's error policy swallowed it.
    pub ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ErrorClassification>,
    pub attempts_used: u32,
    pub passes: u32,
    /// Success came from a fallback, a later pass or an auto-fix.
    pub recovery_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_locator: Option<CandidateLocator>,
    /// Extracted value or screenshot payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub learnings: Vec<String>,
    pub attempts: Vec<ActionAttempt>,
    pub backoff_ms: Vec<u64>,
    pub duration_ms: u64,
}

impl ActionResult {
    pub(crate) fn new(action_id: &str, kind: ActionKind) -> Self {
        Self {
            action_id: action_id.to_string(),
            kind,
            success: false,
            skipped: false,
            ignored: false,
            classification: None,
            attempts_used: 0,
            passes: 0,
            recovery_used: false,
            winning_locator: None,
            output: None,
            learnings: Vec::new(),
            attempts: Vec::new(),
            backoff_ms: Vec::new(),
            duration_ms: 0,
        }
    }
}

/// Everything known about an action that could not be completed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFailure {
    pub classification: ErrorClassification,
    pub attempts: Vec<ActionAttempt>,
    pub context: ExecutionContext,
    pub backoff_ms: Vec<u64>,
    pub learnings: Vec<String>,
}

/// Failures the engine reports. Raw driver errors never escape; every variant
/// carries a classification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("action {} failed after {} attempts ({}): {}", .0.context.action.id, .0.attempts.len(), .0.classification.category, .0.classification.message)]
    Exhausted(Box<ActionFailure>),
    #[error("action {} stopped at the task deadline: {}", .0.context.action.id, .0.classification.message)]
    DeadlineExceeded(Box<ActionFailure>),
    #[error("precondition failed for action {}: {}", .0.context.action.id, .0.classification.message)]
    PreconditionFailed(Box<ActionFailure>),
}

impl EngineError {
    pub fn failure(&self) -> &ActionFailure {
        match self {
            EngineError::Exhausted(f) | EngineError::DeadlineExceeded(f) | EngineError::PreconditionFailed(f) => f,
        }
    }

    pub fn classification(&self) -> &ErrorClassification {
        &self.failure().classification
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Exhausted(_) => "exhausted",
            EngineError::DeadlineExceeded(_) => "deadline_exceeded",
            EngineError::PreconditionFailed(_) => "precondition_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub action_id: String,
    pub reason: &'static str,
    pub classification: ErrorClassification,
    pub message: String,
    pub attempts: Vec<ActionAttempt>,
}

impl From<&EngineError> for TaskFailure {
    fn from(e: &EngineError) -> Self {
        let f = e.failure();
        Self {
            action_id: f.context.action.id.clone(),
            reason: e.kind(),
            classification: f.classification.clone(),
            message: e.to_string(),
            attempts: f.attempts.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub task_id: String,
    pub task_type: String,
    pub website: String,
    pub strategy: Strategy,
    pub success: bool,
    pub results: Vec<ActionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TaskFailure>,
    pub duration_ms: u64,
}

impl TaskReport {
    pub fn result(&self, action_id: &str) -> Option<&ActionResult> {
        self.results.iter().find(|r| r.action_id == action_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("could not open browser driver: {0}")]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Limiter(#[from] LimiterClosed),
    #[error("task join error: {0}")]
    Join(String),
}
