mod matchers;
pub mod policies;

use crate::types::{ActionKind, ErrorCategory, ErrorClassification, ExecutionContext};

use matchers::{scrub, MATCHERS};

/// Longest raw message kept on a classification.
const MAX_MESSAGE_LEN: usize = 512;

/// Interprets a raw driver failure.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, raw: &str, ctx: &ExecutionContext) -> ErrorClassification;
}

/// Pattern-table classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorClassifier;

impl FailureClassifier for ErrorClassifier {
    fn classify(&self, raw: &str, ctx: &ExecutionContext) -> ErrorClassification {
        classify(raw, ctx)
    }
}

/// Classifies `raw` into the closed taxonomy.
///
/// Matchers run in a fixed order and the first hit wins. They only see the
/// driver's wording: the selector being tried, quoted fragments and locator
/// tokens are removed first. A navigate action whose
/// error matched nothing more specific is a navigation failure; anything else
/// unmatched is `unknown`.
pub fn classify(raw: &str, ctx: &ExecutionContext) -> ErrorClassification {
    let category = category_of(raw, ctx);
    classification_for(category, raw)
}

/// Builds the classification for a known category (used for failures the engine
/// detects itself, such as an elapsed deadline).
pub fn classification_for(category: ErrorCategory, raw: &str) -> ErrorClassification {
    ErrorClassification {
        category,
        severity: category.default_severity(),
        message: truncate(raw.trim(), MAX_MESSAGE_LEN),
        remediation: policies::remediation(category),
        auto_fixable: policies::auto_fixable(category),
        retry_policy: policies::default_policy(category),
    }
}

fn category_of(raw: &str, ctx: &ExecutionContext) -> ErrorCategory {
    let text = scrub(raw, ctx.selector.as_deref());
    if let Some((category, _)) = MATCHERS.iter().find(|(_, re)| re.is_match(&text)) {
        return *category;
    }
    if ctx.action.kind == ActionKind::Navigate {
        return ErrorCategory::Navigation;
    }
    ErrorCategory::Unknown
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
