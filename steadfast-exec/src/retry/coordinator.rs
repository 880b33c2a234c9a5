use std::time::Duration;

use steadfast_core::{ErrorClassification, ErrorPolicy, RetryPolicy};
use tokio::time::Instant;
use tracing::debug;

use crate::retry::config::RetryConfig;
use crate::retry::decision::{decide_retry, RetryDecision, RetryReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    Attempting { pass: u32 },
    Classifying { pass: u32 },
    WaitingBackoff { pass: u32, delay: Duration },
    Success { pass: u32 },
    Exhausted { pass: u32, reason: RetryReason },
}

/// Owns the attempt loop of one action: which pass is running, whether a failed
/// pass is followed by another, and the backoff in between.
#[derive(Debug)]
pub struct RetryCoordinator {
    cfg: RetryConfig,
    on_error: ErrorPolicy,
    deadline: Option<Instant>,
    state: RetryState,
    delays: Vec<Duration>,
}

impl RetryCoordinator {
    pub fn new(cfg: RetryConfig, on_error: ErrorPolicy, deadline: Option<Instant>) -> Self {
        Self {
            cfg,
            on_error,
            deadline,
            state: RetryState::Attempting { pass: 1 },
            delays: Vec::new(),
        }
    }

    pub fn state(&self) -> &RetryState {
        &self.state
    }

    pub fn pass(&self) -> u32 {
        match self.state {
            RetryState::Attempting { pass }
            | RetryState::Classifying { pass }
            | RetryState::WaitingBackoff { pass, .. }
            | RetryState::Success { pass }
            | RetryState::Exhausted { pass, .. } => pass,
        }
    }

    /// Backoff delays slept so far, in order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Classification default with the action's override applied.
    pub fn effective_policy(&self, classification: &ErrorClassification) -> RetryPolicy {
        self.on_error.effective_policy(&classification.retry_policy)
    }

    pub fn succeed(&mut self) {
        self.state = RetryState::Success { pass: self.pass() };
    }

    /// Moves a failed pass through classification to either a backoff or exhaustion.
    pub fn fail(&mut self, classification: &ErrorClassification) -> RetryDecision {
        let pass = self.pass();
        self.state = RetryState::Classifying { pass };
        let policy = self.effective_policy(classification);
        let remaining = self
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()));
        let decision = decide_retry(&self.cfg, &policy, pass, classification, remaining, || {
            fastrand::u64(..)
        });
        debug!(pass, category = %classification.category, ?decision, "retry decision");
        self.state = match &decision {
            RetryDecision::RetryAfter { delay, .. } => RetryState::WaitingBackoff {
                pass,
                delay: *delay,
            },
            RetryDecision::Stop { reason } => RetryState::Exhausted {
                pass,
                reason: reason.clone(),
            },
        };
        decision
    }

    /// Sleeps the pending backoff and starts the next pass. No-op in any other state.
    pub async fn wait(&mut self) {
        if let RetryState::WaitingBackoff { pass, delay } = self.state {
            tokio::time::sleep(delay).await;
            self.delays.push(delay);
            self.state = RetryState::Attempting { pass: pass + 1 };
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, RetryState::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadfast_core::{classification_for, ErrorCategory};

    #[tokio::test(start_paused = true)]
    async fn walks_states_to_exhaustion() {
        let mut c = RetryCoordinator::new(RetryConfig::default(), ErrorPolicy::default(), None);
        let timeout = classification_for(ErrorCategory::Timeout, "timed out");
        assert_eq!(c.state(), &RetryState::Attempting { pass: 1 });

        assert!(matches!(c.fail(&timeout), RetryDecision::RetryAfter { .. }));
        assert_eq!(
            c.state(),
            &RetryState::WaitingBackoff {
                pass: 1,
                delay: Duration::from_millis(1000)
            }
        );
        c.wait().await;
        assert_eq!(c.state(), &RetryState::Attempting { pass: 2 });
        c.fail(&timeout);
        c.wait().await;
        assert!(matches!(c.fail(&timeout), RetryDecision::Stop { reason: RetryReason::AttemptsExhausted }));
        assert!(c.is_exhausted());
        assert_eq!(c.delays(), &[Duration::from_millis(1000), Duration::from_millis(2000)]);
    }

    #[test]
    fn override_cannot_lift_category_rule() {
        let on_error = ErrorPolicy::default().with_retry_count(5);
        let mut c = RetryCoordinator::new(RetryConfig::default(), on_error, None);
        let auth = classification_for(ErrorCategory::Authentication, "401 unauthorized");
        assert_eq!(c.effective_policy(&auth).max_attempts, 6);
        assert!(matches!(c.fail(&auth), RetryDecision::Stop { .. }));
    }

    #[test]
    fn success_keeps_pass_number() {
        let mut c = RetryCoordinator::new(RetryConfig::default(), ErrorPolicy::default(), None);
        c.succeed();
        assert_eq!(c.state(), &RetryState::Success { pass: 1 });
    }
}
