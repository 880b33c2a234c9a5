use std::time::Duration;

use crate::types::{ErrorCategory, RetryPolicy};

/// Default retry policy attached to each category.
pub fn default_policy(category: ErrorCategory) -> RetryPolicy {
    match category {
        ErrorCategory::SelectorNotFound => RetryPolicy::new(3, Duration::from_millis(500), 1.5),
        ErrorCategory::ElementNotInteractive => {
            RetryPolicy::new(3, Duration::from_millis(1000), 1.5)
        }
        ErrorCategory::Timeout => RetryPolicy::new(3, Duration::from_millis(1000), 2.0),
        ErrorCategory::Navigation => RetryPolicy::new(3, Duration::from_millis(2000), 2.0),
        ErrorCategory::Network => RetryPolicy::new(2, Duration::from_millis(5000), 2.0),
        ErrorCategory::Authentication | ErrorCategory::Captcha | ErrorCategory::Unknown => {
            RetryPolicy::no_retry()
        }
    }
}

pub fn auto_fixable(category: ErrorCategory) -> bool {
    matches!(
        category,
        ErrorCategory::SelectorNotFound
            | ErrorCategory::ElementNotInteractive
            | ErrorCategory::Timeout
    )
}

pub fn remediation(category: ErrorCategory) -> Vec<String> {
    let steps: &[&str] = match category {
        ErrorCategory::SelectorNotFound => &[
            "try the next candidate locator",
            "regenerate candidates from a fresh page snapshot",
            "prefer stable attributes (id, data-testid, name) over structure",
        ],
        ErrorCategory::ElementNotInteractive => &[
            "wait for the element to become visible and enabled",
            "dismiss overlays covering the element",
            "scroll the element into view",
        ],
        ErrorCategory::Timeout => &[
            "widen the per-call timeout",
            "wait for the page to settle before acting",
        ],
        ErrorCategory::Navigation => &[
            "verify the target url is reachable",
            "retry the navigation after a pause",
        ],
        ErrorCategory::Network => &[
            "check connectivity and proxy settings",
            "retry after the backoff delay",
        ],
        ErrorCategory::Authentication => &[
            "refresh the session or credentials",
            "do not retry automatically",
        ],
        ErrorCategory::Captcha => &[
            "an interactive challenge blocks the page; manual intervention required",
            "reduce request rate for this site",
        ],
        ErrorCategory::Unknown => &["inspect the driver logs; the failure was not recognized"],
    };
    steps.iter().map(|s| s.to_string()).collect()
}
