use std::sync::Arc;

use futures_util::future::join_all;
use steadfast_core::TaskDefinition;
use tracing::{debug, warn};

use crate::driver::DriverFactory;
use crate::executor::concurrency::ConcurrencyLimits;
use crate::executor::result::{TaskError, TaskReport};
use crate::executor::task::TaskRunner;
use crate::executor::types::PoolConfig;

/// Runs task instances concurrently, each with a driver of its own.
pub struct TaskPool {
    runner: Arc<TaskRunner>,
    limits: ConcurrencyLimits,
    factory: Arc<dyn DriverFactory>,
}

impl TaskPool {
    pub fn new(runner: Arc<TaskRunner>, config: &PoolConfig, factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            runner,
            limits: ConcurrencyLimits::new(config.global_concurrency, &config.per_website_concurrency),
            factory,
        }
    }

    /// One result per task, in input order.
    pub async fn run_all(&self, tasks: Vec<TaskDefinition>) -> Vec<Result<TaskReport, TaskError>> {
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let runner = self.runner.clone();
                let limits = self.limits.clone();
                let factory = self.factory.clone();
                tokio::spawn(async move {
                    let _permit = limits.acquire(Some(&task.website)).await?;
                    debug!(task_id = %task.task_id, "opening driver");
                    let driver = factory.open().await?;
                    let report = runner.run(&task, driver.as_ref()).await;
                    if let Err(e) = driver.close().await {
                        warn!(task_id = %task.task_id, error = %e, "could not close driver");
                    }
                    Ok::<_, TaskError>(report)
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(r) => r,
                Err(e) => Err(TaskError::Join(e.to_string())),
            })
            .collect()
    }
}
