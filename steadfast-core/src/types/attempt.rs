use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::classification::ErrorClassification;
use crate::types::common::duration_ms;
use crate::types::locator::CandidateLocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// One try of one candidate locator for one action.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionAttempt {
    pub action_id: String,
    pub candidate: CandidateLocator,
    /// 1-based pass over the candidate chain (a retry starts a new pass).
    pub chain_pass: u32,
    pub candidate_index: usize,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    #[serde(with = "duration_ms", rename = "latencyMs")]
    pub latency: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ErrorClassification>,
}

impl ActionAttempt {
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Success
    }
}
