use chrono::{DateTime, Utc};

use crate::types::locator::LocatorKind;
use crate::types::strategy::Strategy;

/// Immutable record of one outcome, fed to the learning engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub locator: String,
    pub locator_kind: LocatorKind,
    pub success: bool,
    pub website: String,
    pub task_type: String,
    /// Action the locator was tried for; learned alternates stay scoped to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub recorded_at: DateTime<Utc>,
}
