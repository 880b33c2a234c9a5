mod metric;
mod window;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use steadfast_core::{ActionAttempt, Experience, Strategy};
use steadfast_store::{ModelStore, NewMetricSnapshot, StoreError};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub use metric::{Reliability, SelectorMetric, TrackerConfig, Trend};
pub use window::{Sample, SampleWindow};

use metric::SelectorStats;

/// `(website, task_type, locator)`
type Key = (String, String, String);

/// Records every attempt per locator and derives rolling aggregates.
///
/// Safe to share between task instances: the map is behind a read/write lock and
/// every key has its own mutex, so writers on different locators never contend.
pub struct PerformanceTracker {
    cfg: TrackerConfig,
    entries: RwLock<HashMap<Key, Arc<Mutex<SelectorStats>>>>,
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl PerformanceTracker {
    pub fn new(cfg: TrackerConfig) -> Self {
        Self {
            cfg,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    pub async fn record(&self, attempt: &ActionAttempt, website: &str, task_type: &str) {
        let key = (
            website.to_string(),
            task_type.to_string(),
            attempt.candidate.locator.clone(),
        );
        let entry = self.entry(key, attempt, website, task_type).await;
        let mut stats = entry.lock().await;
        let success = attempt.succeeded();
        stats.total += 1;
        if success {
            stats.success += 1;
        } else {
            stats.failure += 1;
        }
        stats.window.push(Sample {
            success,
            latency_ms: attempt.latency.as_millis() as u64,
        });
        stats.last_seen = attempt.started_at;
        debug!(
            locator = %attempt.candidate.locator,
            website,
            task_type,
            success,
            total = stats.total,
            "attempt recorded"
        );
    }

    async fn entry(
        &self,
        key: Key,
        attempt: &ActionAttempt,
        website: &str,
        task_type: &str,
    ) -> Arc<Mutex<SelectorStats>> {
        if let Some(e) = self.entries.read().await.get(&key) {
            return e.clone();
        }
        let mut map = self.entries.write().await;
        map.entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(SelectorStats {
                    locator: attempt.candidate.locator.clone(),
                    kind: attempt.candidate.kind,
                    website: website.to_string(),
                    task_type: task_type.to_string(),
                    total: 0,
                    success: 0,
                    failure: 0,
                    window: SampleWindow::new(self.cfg.window),
                    last_seen: attempt.started_at,
                }))
            })
            .clone()
    }

    pub async fn query(&self, locator: &str, website: &str, task_type: &str) -> Option<SelectorMetric> {
        let key = (website.to_string(), task_type.to_string(), locator.to_string());
        let entry = self.entries.read().await.get(&key).cloned()?;
        let stats = entry.lock().await;
        Some(stats.metric(&self.cfg))
    }

    /// Window success rate per exact locator, for the scorer's history term.
    pub async fn history_for(&self, website: &str, task_type: &str) -> HashMap<String, f64> {
        let entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|((w, t, _), _)| w == website && t == task_type)
            .map(|(_, e)| e.clone())
            .collect();
        let mut out = HashMap::with_capacity(entries.len());
        for e in entries {
            let stats = e.lock().await;
            if !stats.window.is_empty() {
                out.insert(stats.locator.clone(), stats.window.success_rate());
            }
        }
        out
    }

    /// All metrics, ordered by website, task type and locator.
    pub async fn snapshot(&self) -> Vec<SelectorMetric> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut out = Vec::with_capacity(entries.len());
        for (_, e) in entries {
            out.push(e.lock().await.metric(&self.cfg));
        }
        out
    }

    /// Writes the current snapshot to `store`; returns the number of rows written.
    pub async fn persist(&self, store: &dyn ModelStore) -> Result<u64, StoreError> {
        let mut rows = Vec::new();
        for m in self.snapshot().await {
            let metric = serde_json::to_value(&m).map_err(|e| StoreError::Other(e.to_string()))?;
            rows.push(NewMetricSnapshot {
                locator: m.locator,
                website: m.website,
                task_type: m.task_type,
                metric,
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }
        store.save_metric_snapshots(rows).await
    }

    pub fn experience_from(
        attempt: &ActionAttempt,
        website: &str,
        task_type: &str,
        url: Option<&str>,
        strategy: Option<Strategy>,
    ) -> Experience {
        Experience {
            id: uuid::Uuid::new_v4().to_string(),
            locator: attempt.candidate.locator.clone(),
            locator_kind: attempt.candidate.kind,
            success: attempt.succeeded(),
            website: website.to_string(),
            task_type: task_type.to_string(),
            action_id: Some(attempt.action_id.clone()),
            url: url.map(str::to_string),
            strategy,
            recorded_at: Utc::now(),
        }
    }
}
