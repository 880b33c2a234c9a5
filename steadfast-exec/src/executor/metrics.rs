use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::executor::{Event, EventSink};

/// Counters for one task run, built from the event stream.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    pub task_id: String,
    pub success: Option<bool>,
    pub started_at: Option<Instant>,
    pub total_duration: Option<Duration>,
    pub actions_total: usize,
    pub actions_succeeded: usize,
    pub actions_failed: usize,
    pub actions_ignored: usize,
    pub actions_skipped: usize,
    pub actions_recovered: usize,
    pub attempts: usize,
    pub attempt_failures: usize,
    pub retries: usize,
    pub auto_fixes: usize,
    pub side_effects: usize,
}

impl RunMetrics {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            started_at: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn apply(&mut self, event: &Event) {
        match event {
            Event::ActionSucceeded { recovered, .. } => {
                self.actions_total += 1;
                self.actions_succeeded += 1;
                if *recovered {
                    self.actions_recovered += 1;
                }
            }
            Event::ActionFailed { ignored, .. } => {
                self.actions_total += 1;
                if *ignored {
                    self.actions_ignored += 1;
                } else {
                    self.actions_failed += 1;
                }
            }
            Event::ActionSkipped { .. } => {
                self.actions_total += 1;
                self.actions_skipped += 1;
            }
            Event::AttemptFinished { succeeded, .. } => {
                self.attempts += 1;
                if !succeeded {
                    self.attempt_failures += 1;
                }
            }
            Event::RetryScheduled { .. } => self.retries += 1,
            Event::AutoFixApplied { .. } => self.auto_fixes += 1,
            Event::SideEffectHandled { .. } => self.side_effects += 1,
            Event::TaskFinished { success, .. } => {
                self.success = Some(*success);
                self.total_duration = self.started_at.map(|s| s.elapsed());
            }
            Event::TaskStarted { .. } | Event::ActionStarted { .. } => {}
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "task_id": self.task_id,
            "success": self.success,
            "duration_ms": self.total_duration.map(|d| d.as_millis() as u64),
            "actions": {
                "total": self.actions_total,
                "succeeded": self.actions_succeeded,
                "failed": self.actions_failed,
                "ignored": self.actions_ignored,
                "skipped": self.actions_skipped,
                "recovered": self.actions_recovered,
            },
            "attempts": {
                "total": self.attempts,
                "failed": self.attempt_failures,
            },
            "retries": self.retries,
            "auto_fixes": self.auto_fixes,
            "side_effects": self.side_effects,
        })
    }
}

pub struct MetricsCollector {
    metrics: Arc<Mutex<RunMetrics>>,
}

impl MetricsCollector {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            metrics: Arc::new(Mutex::new(RunMetrics::new(task_id))),
        }
    }

    pub async fn record(&self, event: &Event) {
        self.metrics.lock().await.apply(event);
    }

    pub async fn get_metrics(&self) -> RunMetrics {
        self.metrics.lock().await.clone()
    }
}

/// Updates a collector from every event, then forwards to `base`.
pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

#[async_trait]
impl EventSink for MetricsEventSink {
    async fn emit(&self, event: Event) {
        self.collector.record(&event).await;
        self.base.emit(event).await;
    }
}
