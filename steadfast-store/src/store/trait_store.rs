use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::store::types::*;

/// Persistence for learned state. Blobs are opaque JSON; interpreting them (and
/// deciding what a corrupt blob means) is the caller's business.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn load_model(&self, domain: &str) -> Result<Option<ModelRecord>, StoreError>;

    /// Replaces the model for `domain`, bumping its version.
    async fn save_model(&self, domain: &str, model: JsonValue) -> Result<ModelRecord, StoreError>;

    async fn list_domains(&self) -> Result<Vec<String>, StoreError>;

    /// Appends snapshots (history is kept). Returns the number written.
    async fn save_metric_snapshots(&self, snapshots: Vec<NewMetricSnapshot>) -> Result<u64, StoreError>;

    /// Latest snapshot per `(website, task_type, locator)`, optionally for one website.
    async fn load_metric_snapshots(&self, website: Option<&str>) -> Result<Vec<MetricSnapshot>, StoreError>;

    /// Experiences are immutable; appending an existing id is a no-op.
    async fn append_experience(&self, experience: NewExperience) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_experiences(&self, website: &str, limit: i64) -> Result<Vec<ExperienceRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}
