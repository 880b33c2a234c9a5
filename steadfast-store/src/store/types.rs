use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// Latest learning model blob for one domain.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ModelRecord {
    pub domain: String,
    pub model: JsonValue,
    /// Incremented on every save; starts at 1.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMetricSnapshot {
    pub locator: String,
    pub website: String,
    pub task_type: String,
    pub metric: JsonValue,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MetricSnapshot {
    pub id: i64,
    pub locator: String,
    pub website: String,
    pub task_type: String,
    pub metric: JsonValue,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExperience {
    pub id: String,
    pub website: String,
    pub task_type: String,
    pub payload: JsonValue,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ExperienceRecord {
    pub id: String,
    pub website: String,
    pub task_type: String,
    pub payload: JsonValue,
    pub recorded_at: DateTime<Utc>,
}
