use std::fmt;

use crate::types::policy::RetryPolicy;

/// Closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    SelectorNotFound,
    Network,
    Timeout,
    Authentication,
    Captcha,
    ElementNotInteractive,
    Navigation,
    Unknown,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 8] = [
        ErrorCategory::SelectorNotFound,
        ErrorCategory::Network,
        ErrorCategory::Timeout,
        ErrorCategory::Authentication,
        ErrorCategory::Captcha,
        ErrorCategory::ElementNotInteractive,
        ErrorCategory::Navigation,
        ErrorCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::SelectorNotFound => "selector_not_found",
            ErrorCategory::Network => "network",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Captcha => "captcha",
            ErrorCategory::ElementNotInteractive => "element_not_interactive",
            ErrorCategory::Navigation => "navigation",
            ErrorCategory::Unknown => "unknown",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            ErrorCategory::Authentication | ErrorCategory::Captcha => Severity::Critical,
            ErrorCategory::Network | ErrorCategory::Unknown => Severity::High,
            ErrorCategory::SelectorNotFound
            | ErrorCategory::ElementNotInteractive
            | ErrorCategory::Timeout
            | ErrorCategory::Navigation => Severity::Medium,
        }
    }

    /// Failures that make trying another candidate pointless: an interactive
    /// challenge or rejected credentials look the same whichever element is used.
    pub fn aborts_chain(&self) -> bool {
        matches!(self, ErrorCategory::Captcha | ErrorCategory::Authentication)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Categorized, severity-tagged interpretation of one failure.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClassification {
    pub category: ErrorCategory,
    pub severity: Severity,
    pub message: String,
    pub remediation: Vec<String>,
    pub auto_fixable: bool,
    pub retry_policy: RetryPolicy,
}

impl ErrorClassification {
    pub fn is_recoverable(&self) -> bool {
        !self.category.aborts_chain()
    }
}
