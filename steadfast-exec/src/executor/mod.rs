mod call;
pub mod concurrency;
mod engine;
pub mod events;
pub mod metrics;
mod pool;
mod result;
mod services;
mod side_effects;
mod task;
mod types;

pub use concurrency::{ConcurrencyLimits, ConcurrencyPermit, LimiterClosed};
pub use engine::{ExecutionEngine, RunScope};
pub use events::{
    CompositeEventSink, Event, EventBus, EventSink, NoOpEventSink, RecordingEventSink,
    StdoutEventSink, Subscription, TracingEventSink,
};
pub use metrics::{MetricsCollector, MetricsEventSink, RunMetrics};
pub use pool::TaskPool;
pub use result::{ActionFailure, ActionResult, EngineError, TaskError, TaskFailure, TaskReport};
pub use services::Services;
pub use task::{TaskRunner, START_ACTION_ID};
pub use types::{AutoFixConfig, EngineConfig, PoolConfig};
