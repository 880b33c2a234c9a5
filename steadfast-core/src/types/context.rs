use chrono::{DateTime, Utc};

use crate::types::action::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ActionRef {
    pub id: String,
    pub kind: ActionKind,
}

/// Everything downstream components may look at when interpreting a failure.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecutionContext {
    pub task: String,
    pub action: ActionRef,
    pub url: Option<String>,
    pub selector: Option<String>,
    pub logs: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionContext {
    pub fn new(task: impl Into<String>, action_id: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            task: task.into(),
            action: ActionRef {
                id: action_id.into(),
                kind,
            },
            url: None,
            selector: None,
            logs: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }
}
