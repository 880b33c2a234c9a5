use thiserror::Error;

#[derive(Debug, Error)]
pub enum SteadfastError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to auto-detect document format (neither valid JSON nor valid YAML)")]
    UnknownFormat,
}

#[derive(Debug, Clone, Error)]
#[error("validation failed ({violations_len} violations): {summary}")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    violations_len: usize,
    summary: String,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        let summary = violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            violations,
            violations_len,
            summary,
        }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(path, message)])
    }

    /// Re-roots every violation path under `prefix` (used when an action is validated
    /// on its own and then embedded in a task document).
    pub fn prefixed(self, prefix: &str) -> Self {
        let violations = self
            .violations
            .into_iter()
            .map(|v| Violation::new(format!("{prefix}{}", v.path.trim_start_matches('$')), v.message))
            .collect();
        Self::new(violations)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
