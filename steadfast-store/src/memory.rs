use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use crate::store::{
    ExperienceRecord, MetricSnapshot, ModelRecord, ModelStore, NewExperience, NewMetricSnapshot,
    StoreError,
};

#[derive(Default)]
struct State {
    models: BTreeMap<String, ModelRecord>,
    metrics: Vec<MetricSnapshot>,
    experiences: Vec<ExperienceRecord>,
    experience_ids: HashSet<String>,
}

/// Process-local store used by tests and store-less runs.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a blob as-is, bypassing any serialization the caller would do.
    pub async fn put_raw_model(&self, domain: &str, model: JsonValue) {
        let mut state = self.state.write().await;
        let version = state.models.get(domain).map(|m| m.version + 1).unwrap_or(1);
        state.models.insert(
            domain.to_string(),
            ModelRecord {
                domain: domain.to_string(),
                model,
                version,
                updated_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl ModelStore for InMemoryStore {
    async fn load_model(&self, domain: &str) -> Result<Option<ModelRecord>, StoreError> {
        Ok(self.state.read().await.models.get(domain).cloned())
    }

    async fn save_model(&self, domain: &str, model: JsonValue) -> Result<ModelRecord, StoreError> {
        self.put_raw_model(domain, model).await;
        self.state
            .read()
            .await
            .models
            .get(domain)
            .cloned()
            .ok_or_else(|| StoreError::Other(format!("model for {domain} vanished after save")))
    }

    async fn list_domains(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.state.read().await.models.keys().cloned().collect())
    }

    async fn save_metric_snapshots(&self, snapshots: Vec<NewMetricSnapshot>) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let n = snapshots.len() as u64;
        let now = Utc::now();
        for s in snapshots {
            let id = state.metrics.len() as i64 + 1;
            state.metrics.push(MetricSnapshot {
                id,
                locator: s.locator,
                website: s.website,
                task_type: s.task_type,
                metric: s.metric,
                captured_at: now,
            });
        }
        Ok(n)
    }

    async fn load_metric_snapshots(&self, website: Option<&str>) -> Result<Vec<MetricSnapshot>, StoreError> {
        let state = self.state.read().await;
        let mut latest: BTreeMap<(String, String, String), MetricSnapshot> = BTreeMap::new();
        for s in state
            .metrics
            .iter()
            .filter(|s| website.map_or(true, |w| s.website == w))
        {
            // Later ids win.
            latest.insert(
                (s.website.clone(), s.task_type.clone(), s.locator.clone()),
                s.clone(),
            );
        }
        Ok(latest.into_values().collect())
    }

    async fn append_experience(&self, experience: NewExperience) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.experience_ids.insert(experience.id.clone()) {
            return Ok(());
        }
        state.experiences.push(ExperienceRecord {
            id: experience.id,
            website: experience.website,
            task_type: experience.task_type,
            payload: experience.payload,
            recorded_at: experience.recorded_at,
        });
        Ok(())
    }

    async fn list_experiences(&self, website: &str, limit: i64) -> Result<Vec<ExperienceRecord>, StoreError> {
        let state = self.state.read().await;
        let mut out: Vec<ExperienceRecord> = state
            .experiences
            .iter()
            .filter(|e| e.website == website)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }
}
