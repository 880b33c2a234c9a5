mod autofix;
mod config;
mod coordinator;
mod decision;

pub use autofix::{
    run_auto_fix, AlternateCandidate, AutoFixError, AutoFixHook, AutoFixRequest, PassAdjustments,
    WidenTimeout,
};
pub use config::{Jitter, RetryConfig};
pub use coordinator::{RetryCoordinator, RetryState};
pub use decision::{decide_retry, RetryDecision, RetryReason};
