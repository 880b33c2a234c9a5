use std::time::Duration;

use steadfast_core::{ErrorCategory, ErrorClassification, RetryPolicy};

use crate::retry::config::{Jitter, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    /// The policy's rule rejected this category.
    NotRetryable(ErrorCategory),
    AttemptsExhausted,
    /// The next attempt could not start before the task deadline.
    DeadlineExceeded,
    Backoff,
}

impl RetryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::NotRetryable(_) => "not retryable",
            RetryReason::AttemptsExhausted => "attempts exhausted",
            RetryReason::DeadlineExceeded => "deadline exceeded",
            RetryReason::Backoff => "backoff",
        }
    }
}

/// Decide if another pass should run and how long to wait first.
///
/// - `attempt_no`: 1-based number of the pass that just failed.
/// - `policy`: effective policy (classification default with the action's override).
/// - `remaining`: time left before the task deadline, if any.
/// - `rand_u64`: RNG for full jitter.
pub fn decide_retry(
    cfg: &RetryConfig,
    policy: &RetryPolicy,
    attempt_no: u32,
    classification: &ErrorClassification,
    remaining: Option<Duration>,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    if !policy.rule.should_retry(attempt_no, classification) {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable(classification.category),
        };
    }
    if attempt_no >= policy.max_attempts {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }

    // Exponential backoff: base * factor^(attempt_no-1), capped by policy then globally.
    let raw = policy.delay_for(attempt_no).min(cfg.max_delay);
    let delay = match cfg.jitter {
        Jitter::None => raw,
        Jitter::Full => {
            let raw_ms = raw.as_millis() as u64;
            let ms = if raw_ms == 0 { 0 } else { rand_u64() % (raw_ms + 1) };
            Duration::from_millis(ms)
        }
    };

    if let Some(left) = remaining {
        if delay >= left {
            return RetryDecision::Stop {
                reason: RetryReason::DeadlineExceeded,
            };
        }
    }

    RetryDecision::RetryAfter {
        delay,
        reason: RetryReason::Backoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadfast_core::{classification_for, RetryRule};

    fn timeout() -> ErrorClassification {
        classification_for(ErrorCategory::Timeout, "timed out")
    }

    #[test]
    fn backoff_grows_geometrically() {
        let cfg = RetryConfig::default();
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0);
        let c = timeout();
        assert_eq!(
            decide_retry(&cfg, &policy, 1, &c, None, || 0),
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(1000),
                reason: RetryReason::Backoff
            }
        );
        assert_eq!(
            decide_retry(&cfg, &policy, 2, &c, None, || 0),
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(2000),
                reason: RetryReason::Backoff
            }
        );
        assert_eq!(
            decide_retry(&cfg, &policy, 3, &c, None, || 0),
            RetryDecision::Stop {
                reason: RetryReason::AttemptsExhausted
            }
        );
    }

    #[test]
    fn rule_rejects_before_limit() {
        let cfg = RetryConfig::default();
        let policy = RetryPolicy::default().with_rule(RetryRule::Never);
        let c = classification_for(ErrorCategory::Authentication, "401");
        assert_eq!(
            decide_retry(&cfg, &policy, 1, &c, None, || 0),
            RetryDecision::Stop {
                reason: RetryReason::NotRetryable(ErrorCategory::Authentication)
            }
        );
    }

    #[test]
    fn global_cap_and_jitter() {
        let cfg = RetryConfig {
            max_delay: Duration::from_millis(1500),
            jitter: Jitter::Full,
        };
        let policy = RetryPolicy::new(5, Duration::from_millis(1000), 4.0);
        let c = timeout();
        match decide_retry(&cfg, &policy, 2, &c, None, || 10_000) {
            RetryDecision::RetryAfter { delay, .. } => {
                assert!(delay <= Duration::from_millis(1500));
                assert_eq!(delay, Duration::from_millis(10_000 % 1501));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deadline_stops_retrying() {
        let cfg = RetryConfig::default();
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0);
        assert_eq!(
            decide_retry(&cfg, &policy, 1, &timeout(), Some(Duration::from_millis(999)), || 0),
            RetryDecision::Stop {
                reason: RetryReason::DeadlineExceeded
            }
        );
    }
}
