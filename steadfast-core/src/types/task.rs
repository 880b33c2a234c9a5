use crate::types::action::Action;
use crate::types::strategy::Strategy;

/// A complete task document: one site, one task type, an ordered list of actions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub task_id: String,
    pub task_type: String,
    /// Site key (domain) used for metrics and learned models.
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    /// Pinned strategy; when absent the learning engine may suggest one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    pub actions: Vec<Action>,
}

impl TaskDefinition {
    pub fn new(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        website: impl Into<String>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_type: task_type.into(),
            website: website.into(),
            start_url: None,
            strategy: None,
            deadline_ms: None,
            actions,
        }
    }

    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = Some(url.into());
        self
    }

    pub fn with_deadline_ms(mut self, ms: u64) -> Self {
        self.deadline_ms = Some(ms);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id() == id)
    }
}
