use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, thiserror::Error)]
#[error("concurrency limiter closed")]
pub struct LimiterClosed;

/// Global and per-website bounds on concurrently running task instances.
#[derive(Clone)]
pub struct ConcurrencyLimits {
    global: Arc<Semaphore>,
    per_website: Arc<HashMap<String, Arc<Semaphore>>>,
}

impl ConcurrencyLimits {
    pub fn new(global_limit: usize, per_website_limits: &BTreeMap<String, usize>) -> Self {
        Self {
            global: Arc::new(Semaphore::new(global_limit.max(1))),
            per_website: Arc::new(
                per_website_limits
                    .iter()
                    .map(|(k, v)| (k.clone(), Arc::new(Semaphore::new((*v).max(1)))))
                    .collect(),
            ),
        }
    }

    pub async fn acquire(&self, website: Option<&str>) -> Result<ConcurrencyPermit, LimiterClosed> {
        let global = self
            .global
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LimiterClosed)?;
        let site = match website.and_then(|w| self.per_website.get(w)) {
            Some(sem) => Some(sem.clone().acquire_owned().await.map_err(|_| LimiterClosed)?),
            None => None,
        };
        Ok(ConcurrencyPermit {
            _global: global,
            _site: site,
        })
    }

    pub fn available(&self) -> usize {
        self.global.available_permits()
    }
}

pub struct ConcurrencyPermit {
    _global: OwnedSemaphorePermit,
    _site: Option<OwnedSemaphorePermit>,
}
