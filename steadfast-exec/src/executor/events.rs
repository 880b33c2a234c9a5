use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use steadfast_core::{ActionKind, ErrorCategory};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TaskStarted {
        task_id: String,
        website: String,
        task_type: String,
    },
    TaskFinished {
        task_id: String,
        success: bool,
    },
    ActionStarted {
        task_id: String,
        action_id: String,
        kind: ActionKind,
    },
    AttemptFinished {
        task_id: String,
        action_id: String,
        pass: u32,
        locator: String,
        succeeded: bool,
        latency_ms: u64,
        category: Option<ErrorCategory>,
    },
    RetryScheduled {
        task_id: String,
        action_id: String,
        pass: u32,
        delay_ms: u64,
        category: ErrorCategory,
    },
    AutoFixApplied {
        task_id: String,
        action_id: String,
        hook: String,
        note: String,
    },
    ActionSucceeded {
        task_id: String,
        action_id: String,
        attempts: u32,
        recovered: bool,
    },
    ActionFailed {
        task_id: String,
        action_id: String,
        category: ErrorCategory,
        ignored: bool,
    },
    ActionSkipped {
        task_id: String,
        action_id: String,
        reason: String,
    },
    SideEffectHandled {
        task_id: String,
        handler: String,
        locator: String,
    },
}

impl Event {
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::TaskStarted { .. } => "task.started",
            Event::TaskFinished { .. } => "task.finished",
            Event::ActionStarted { .. } => "action.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::RetryScheduled { .. } => "action.retry_scheduled",
            Event::AutoFixApplied { .. } => "action.auto_fix",
            Event::ActionSucceeded { .. } => "action.succeeded",
            Event::ActionFailed { .. } => "action.failed",
            Event::ActionSkipped { .. } => "action.skipped",
            Event::SideEffectHandled { .. } => "side_effect.handled",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let ty = self.type_name();
        match self {
            Event::TaskStarted { task_id, website, task_type } => {
                json!({ "type": ty, "task_id": task_id, "website": website, "task_type": task_type })
            }
            Event::TaskFinished { task_id, success } => {
                json!({ "type": ty, "task_id": task_id, "success": success })
            }
            Event::ActionStarted { task_id, action_id, kind } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "kind": kind.as_str() })
            }
            Event::AttemptFinished { task_id, action_id, pass, locator, succeeded, latency_ms, category } => {
                json!({
                    "type": ty,
                    "task_id": task_id,
                    "action_id": action_id,
                    "pass": pass,
                    "locator": locator,
                    "succeeded": succeeded,
                    "latency_ms": latency_ms,
                    "category": category.map(|c| c.as_str()),
                })
            }
            Event::RetryScheduled { task_id, action_id, pass, delay_ms, category } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "pass": pass, "delay_ms": delay_ms, "category": category.as_str() })
            }
            Event::AutoFixApplied { task_id, action_id, hook, note } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "hook": hook, "note": note })
            }
            Event::ActionSucceeded { task_id, action_id, attempts, recovered } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "attempts": attempts, "recovered": recovered })
            }
            Event::ActionFailed { task_id, action_id, category, ignored } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "category": category.as_str(), "ignored": ignored })
            }
            Event::ActionSkipped { task_id, action_id, reason } => {
                json!({ "type": ty, "task_id": task_id, "action_id": action_id, "reason": reason })
            }
            Event::SideEffectHandled { task_id, handler, locator } => {
                json!({ "type": ty, "task_id": task_id, "handler": handler, "locator": locator })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// JSON lines on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", event.to_json());
    }
}

/// Events as `tracing` records under the `steadfast::events` target.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::ActionFailed { .. } | Event::RetryScheduled { .. } => {
                tracing::warn!(target: "steadfast::events", event = event.type_name(), payload = %event.to_json());
            }
            _ => {
                tracing::info!(target: "steadfast::events", event = event.type_name(), payload = %event.to_json());
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

/// Handle returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping the handle makes the subscription impossible to remove"]
pub struct Subscription {
    id: u64,
}

/// Fan-out to a changing set of observers.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: RwLock<BTreeMap<u64, Arc<dyn EventSink>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, sink: Arc<dyn EventSink>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().await.insert(id, sink);
        Subscription { id }
    }

    /// Returns false if the subscription was already removed.
    pub async fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.subscribers
            .write()
            .await
            .remove(&subscription.id)
            .is_some()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[async_trait]
impl EventSink for EventBus {
    async fn emit(&self, event: Event) {
        let sinks: Vec<Arc<dyn EventSink>> = self.subscribers.read().await.values().cloned().collect();
        for sink in sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Keeps every event in memory; handy for tests and for `--events` summaries.
#[derive(Default)]
pub struct RecordingEventSink {
    events: tokio::sync::Mutex<Vec<Event>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}
