pub mod action;
pub mod attempt;
pub mod classification;
pub mod common;
pub mod context;
pub mod experience;
pub mod locator;
pub mod policy;
pub mod strategy;
pub mod task;

pub use action::{
    Action, ActionBuilder, ActionDef, ActionKind, ActionSpec, ErrorPolicy, Precondition,
    PreconditionPolicy, Target,
};
pub use attempt::{ActionAttempt, AttemptOutcome};
pub use classification::{ErrorCategory, ErrorClassification, Severity};
pub use context::{ActionRef, ExecutionContext};
pub use experience::Experience;
pub use locator::{CandidateLocator, LocatorKind, LocatorSet};
pub use policy::{RetryPolicy, RetryRule};
pub use strategy::Strategy;
pub use task::TaskDefinition;
