#![forbid(unsafe_code)]

//! Domain model for resilient browser actions.
//!
//! Everything in this crate is pure: task documents are parsed and validated,
//! candidate locators are generated and ranked from a static page snapshot, and
//! driver failures are classified from their message text. Anything that talks
//! to a browser or persists state lives in `steadfast-exec` / `steadfast-store`.

pub mod candidates;
pub mod classify;
pub mod error;
pub mod parser;
pub mod types;
pub mod validate;

pub use crate::candidates::{
    default_strategies, rank, CandidateStrategy, ElementHint, KindBias, PageSnapshot, RankContext,
    ScoringWeights, SelectorScorer,
};
pub use crate::classify::{classification_for, classify, ErrorClassifier, FailureClassifier};
pub use crate::error::{ParseError, SteadfastError, ValidationError, Violation};
pub use crate::parser::{parse_str, parse_task_str, DocumentFormat, ParsedTask};
pub use crate::types::{
    Action, ActionAttempt, ActionKind, ActionSpec, AttemptOutcome, CandidateLocator,
    ErrorCategory, ErrorClassification, ErrorPolicy, ExecutionContext, Experience, LocatorKind,
    LocatorSet, Precondition, PreconditionPolicy, RetryPolicy, RetryRule, Severity, Strategy,
    Target, TaskDefinition,
};
pub use crate::validate::{validate_task, Validate};
