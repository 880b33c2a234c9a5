#![forbid(unsafe_code)]

//! Runtime for resilient browser actions.
//!
//! The [`ExecutionEngine`] walks ranked candidate locators through a
//! [`BrowserDriver`], classifies every failure, retries per category and feeds
//! each attempt to the [`PerformanceTracker`] and [`LearningEngine`].

pub mod driver;
pub mod executor;
pub mod learning;
pub mod retry;
pub mod tracker;

pub use crate::driver::{BrowserDriver, DriverError, DriverFactory, WaitTarget};
pub use crate::executor::{
    ActionResult, EngineConfig, EngineError, ExecutionEngine, RunScope, Services, TaskPool,
    TaskReport, TaskRunner,
};
pub use crate::learning::{LearningConfig, LearningContext, LearningEngine};
pub use crate::retry::{RetryConfig, RetryCoordinator};
pub use crate::tracker::{PerformanceTracker, SelectorMetric, TrackerConfig};
