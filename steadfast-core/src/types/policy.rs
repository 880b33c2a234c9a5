use std::time::Duration;

use crate::types::classification::{ErrorCategory, ErrorClassification};
use crate::types::common::duration_ms;

/// Retry predicate, expressed as a closed value so policies stay plain data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetryRule {
    Always,
    Never,
    /// Allow retries only while the failed attempt number is below `n`.
    MaxAttempt { n: u32 },
    /// Refuse to retry failures of the listed categories.
    UnlessCategory { categories: Vec<ErrorCategory> },
    /// Every inner rule must allow the retry.
    All { rules: Vec<RetryRule> },
}

impl RetryRule {
    /// `attempt_no` is the 1-based number of the attempt that just failed.
    pub fn should_retry(&self, attempt_no: u32, classification: &ErrorClassification) -> bool {
        match self {
            RetryRule::Always => true,
            RetryRule::Never => false,
            RetryRule::MaxAttempt { n } => attempt_no < *n,
            RetryRule::UnlessCategory { categories } => {
                !categories.contains(&classification.category)
            }
            RetryRule::All { rules } => rules
                .iter()
                .all(|r| r.should_retry(attempt_no, classification)),
        }
    }

    pub fn and(self, other: RetryRule) -> RetryRule {
        match (self, other) {
            (RetryRule::Always, r) | (r, RetryRule::Always) => r,
            (RetryRule::All { mut rules }, r) => {
                rules.push(r);
                RetryRule::All { rules }
            }
            (a, b) => RetryRule::All { rules: vec![a, b] },
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_ms", rename = "baseDelayMs")]
    pub base_delay: Duration,
    pub backoff_multiplier: f64,
    #[serde(with = "duration_ms", rename = "maxDelayMs")]
    pub max_delay: Duration,
    pub rule: RetryRule,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            rule: RetryRule::Always,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_multiplier,
            ..Self::default()
        }
    }

    /// A policy that allows exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_delay: Duration::ZERO,
            rule: RetryRule::Never,
        }
    }

    pub fn with_rule(mut self, rule: RetryRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Backoff before the attempt following attempt `attempt_no` (1-based):
    /// `base_delay * backoff_multiplier^(attempt_no - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt_no: u32) -> Duration {
        let exp = attempt_no.saturating_sub(1) as i32;
        let raw_ms = (self.base_delay.as_millis() as f64) * self.backoff_multiplier.powi(exp);
        let cap_ms = self.max_delay.as_millis() as f64;
        let ms = if raw_ms.is_finite() { raw_ms.min(cap_ms) } else { cap_ms };
        Duration::from_millis(ms.max(0.0) as u64)
    }

    /// Whether another attempt may follow the failed attempt `attempt_no`.
    pub fn allows_retry(&self, attempt_no: u32, classification: &ErrorClassification) -> bool {
        attempt_no < self.max_attempts && self.rule.should_retry(attempt_no, classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::classification::Severity;

    fn classification(category: ErrorCategory) -> ErrorClassification {
        ErrorClassification {
            category,
            severity: Severity::Medium,
            message: "x".into(),
            remediation: vec![],
            auto_fixable: false,
            retry_policy: RetryPolicy::default(),
        }
    }

    #[test]
    fn delay_grows_geometrically_and_is_capped() {
        let p = RetryPolicy::new(5, Duration::from_millis(1000), 2.0)
            .with_max_delay(Duration::from_millis(5000));
        let delays: Vec<u128> = (1..=5).map(|k| p.delay_for(k).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn delay_is_monotonic_for_multiplier_at_least_one() {
        for mult in [1.0, 1.25, 1.5, 3.0] {
            let p = RetryPolicy::new(10, Duration::from_millis(250), mult);
            let mut prev = Duration::ZERO;
            for k in 1..=10 {
                let d = p.delay_for(k);
                assert!(d >= prev, "multiplier {mult} attempt {k}");
                prev = d;
            }
        }
    }

    #[test]
    fn rule_rejects_independent_of_cap() {
        let p = RetryPolicy::new(10, Duration::from_millis(10), 1.0).with_rule(
            RetryRule::UnlessCategory {
                categories: vec![ErrorCategory::Captcha],
            },
        );
        assert!(p.allows_retry(1, &classification(ErrorCategory::Timeout)));
        assert!(!p.allows_retry(1, &classification(ErrorCategory::Captcha)));
        assert!(!p.allows_retry(10, &classification(ErrorCategory::Timeout)));
    }
}
