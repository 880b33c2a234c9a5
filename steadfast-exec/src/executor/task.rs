use std::sync::Arc;

use steadfast_core::{Action, Strategy, TaskDefinition};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::driver::BrowserDriver;
use crate::executor::engine::{ExecutionEngine, RunScope};
use crate::executor::events::{Event, EventSink};
use crate::executor::result::{TaskFailure, TaskReport};

/// Id of the implicit navigate issued for a task's `startUrl`.
pub const START_ACTION_ID: &str = "start-url";

/// Runs the actions of one task in order against one driver.
pub struct TaskRunner {
    engine: Arc<ExecutionEngine>,
    persist: bool,
}

impl TaskRunner {
    pub fn new(engine: Arc<ExecutionEngine>) -> Self {
        Self {
            engine,
            persist: true,
        }
    }

    /// Save learning models and metric snapshots after the run (needs a store).
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn engine(&self) -> &Arc<ExecutionEngine> {
        &self.engine
    }

    /// Stops at the first action that fails without being ignored. Never
    /// returns an error: failures are part of the report.
    pub async fn run(&self, task: &TaskDefinition, driver: &dyn BrowserDriver) -> TaskReport {
        let started = Instant::now();
        let services = self.engine.services();
        if let Some(store) = &services.store {
            services.learning.ensure_loaded(&task.website, store.as_ref()).await;
        }

        let strategy = self.choose_strategy(task).await;
        let mut scope = RunScope::for_task(task).with_strategy(strategy);
        info!(task_id = %task.task_id, website = %task.website, %strategy, "task started");
        services
            .events
            .emit(Event::TaskStarted {
                task_id: task.task_id.clone(),
                website: task.website.clone(),
                task_type: task.task_type.clone(),
            })
            .await;

        let start = match &task.start_url {
            Some(url) => match Action::navigate(START_ACTION_ID, url.clone()) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(task_id = %task.task_id, error = %e, "ignoring invalid start url");
                    None
                }
            },
            None => None,
        };

        let mut results = Vec::with_capacity(task.actions.len() + 1);
        let mut failure = None;
        for action in start.iter().chain(task.actions.iter()) {
            match self.engine.execute(action, driver, &mut scope).await {
                Ok(r) => results.push(r),
                Err(e) => {
                    warn!(task_id = %task.task_id, error = %e, "task stopped");
                    failure = Some(TaskFailure::from(&e));
                    break;
                }
            }
        }

        let success = failure.is_none();
        services
            .events
            .emit(Event::TaskFinished {
                task_id: task.task_id.clone(),
                success,
            })
            .await;
        if self.persist {
            self.persist(&task.website).await;
        }
        info!(task_id = %task.task_id, success, "task finished");

        TaskReport {
            task_id: task.task_id.clone(),
            task_type: task.task_type.clone(),
            website: task.website.clone(),
            strategy,
            success,
            results,
            failure,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// The task's pinned strategy, else the learned one when confident enough.
    /// Otherwise `direct`, or now and then an under-sampled strategy so the
    /// alternatives collect evidence too.
    async fn choose_strategy(&self, task: &TaskDefinition) -> Strategy {
        if let Some(s) = task.strategy {
            return s;
        }
        let learning = &self.engine.services().learning;
        let cfg = learning.config();
        let suggestion = learning.best_strategy(&task.task_type, &task.website).await;
        if suggestion.confidence >= cfg.confidence_threshold {
            return suggestion.strategy;
        }
        if cfg.exploration_rate > 0.0 && fastrand::f64() < cfg.exploration_rate {
            if let Some(s) = learning
                .under_sampled_strategy(&task.task_type, &task.website)
                .await
            {
                debug!(task_id = %task.task_id, strategy = %s, "exploring strategy");
                return s;
            }
        }
        Strategy::Direct
    }

    async fn persist(&self, website: &str) {
        let services = self.engine.services();
        let Some(store) = &services.store else {
            return;
        };
        if let Err(e) = services.learning.save(website, store.as_ref()).await {
            warn!(website, error = %e, "could not save learning model");
        }
        if let Err(e) = services.tracker.persist(store.as_ref()).await {
            warn!(website, error = %e, "could not save metric snapshots");
        }
    }
}
