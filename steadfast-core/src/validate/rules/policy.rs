use crate::types::{ErrorPolicy, RetryPolicy, RetryRule};
use crate::validate::validator::Validator;

/// Upper bound on authored retries; anything above is almost certainly a typo.
const MAX_RETRY_COUNT: u32 = 20;

pub(crate) fn validate_error_policy(v: &mut Validator, path: &str, policy: &ErrorPolicy) {
    if let Some(n) = policy.retry_count {
        if n > MAX_RETRY_COUNT {
            v.push(
                format!("{path}.retryCount"),
                format!("must be at most {MAX_RETRY_COUNT}"),
            );
        }
    }
    if let Some(p) = &policy.retry_policy {
        validate_retry_policy(v, &format!("{path}.retryPolicy"), p);
    }
}

pub(crate) fn validate_retry_policy(v: &mut Validator, path: &str, p: &RetryPolicy) {
    if !p.backoff_multiplier.is_finite() || p.backoff_multiplier <= 0.0 {
        v.push(
            format!("{path}.backoffMultiplier"),
            "must be a finite number greater than zero",
        );
    }
    if p.max_delay < p.base_delay {
        v.push(
            format!("{path}.maxDelayMs"),
            "must not be lower than baseDelayMs",
        );
    }
    validate_rule(v, &format!("{path}.rule"), &p.rule);
}

fn validate_rule(v: &mut Validator, path: &str, rule: &RetryRule) {
    match rule {
        RetryRule::MaxAttempt { n: 0 } => v.push(format!("{path}.n"), "must be at least 1"),
        RetryRule::UnlessCategory { categories } if categories.is_empty() => {
            v.push(format!("{path}.categories"), "must have at least one entry")
        }
        RetryRule::All { rules } => {
            for (idx, r) in rules.iter().enumerate() {
                validate_rule(v, &format!("{path}.rules[{idx}]"), r);
            }
        }
        _ => {}
    }
}
