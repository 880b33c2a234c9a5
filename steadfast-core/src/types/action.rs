use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;
use crate::types::common::opt_duration_ms;
use crate::types::locator::{CandidateLocator, LocatorSet};
use crate::types::policy::{RetryPolicy, RetryRule};
use crate::validate::validator::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Click,
    Type,
    Wait,
    Extract,
    Screenshot,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Wait => "wait",
            ActionKind::Extract => "extract",
            ActionKind::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary locator set plus ordered fallback sets for one element.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Target {
    pub primary: LocatorSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<LocatorSet>,
}

impl Target {
    pub fn new(primary: LocatorSet) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
        }
    }

    /// Shorthand for a target whose primary set holds a single authored locator.
    pub fn locator(locator: impl Into<String>) -> Self {
        Self::new(LocatorSet::new(vec![CandidateLocator::authored(locator)]))
    }

    pub fn with_fallback(mut self, set: LocatorSet) -> Self {
        self.fallbacks.push(set);
        self
    }

    pub fn with_fallback_locator(self, locator: impl Into<String>) -> Self {
        self.with_fallback(LocatorSet::new(vec![CandidateLocator::authored(locator)]))
    }

    /// `[primary, ...fallbacks]` in declaration order.
    pub fn sets(&self) -> impl Iterator<Item = &LocatorSet> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }

    pub fn candidate_count(&self) -> usize {
        self.sets().map(LocatorSet::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    Navigate {
        url: String,
    },
    Click {
        target: Target,
    },
    Type {
        target: Target,
        text: String,
        #[serde(default)]
        clear: bool,
    },
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Target>,
        #[serde(
            default,
            rename = "durationMs",
            with = "opt_duration_ms",
            skip_serializing_if = "Option::is_none"
        )]
        duration: Option<Duration>,
    },
    Extract {
        target: Target,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
    Screenshot,
}

impl ActionSpec {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionSpec::Navigate { .. } => ActionKind::Navigate,
            ActionSpec::Click { .. } => ActionKind::Click,
            ActionSpec::Type { .. } => ActionKind::Type,
            ActionSpec::Wait { .. } => ActionKind::Wait,
            ActionSpec::Extract { .. } => ActionKind::Extract,
            ActionSpec::Screenshot => ActionKind::Screenshot,
        }
    }

    /// Element target, if this kind of action addresses an element.
    pub fn target(&self) -> Option<&Target> {
        match self {
            ActionSpec::Click { target }
            | ActionSpec::Type { target, .. }
            | ActionSpec::Extract { target, .. } => Some(target),
            ActionSpec::Wait { target, .. } => target.as_ref(),
            ActionSpec::Navigate { .. } | ActionSpec::Screenshot => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Precondition {
    ElementPresent { locator: String },
    TextPresent { text: String },
}

/// What to do when a declared precondition does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionPolicy {
    Continue,
    #[default]
    Skip,
    Retry,
    Fail,
}

/// Per-action error handling as authored.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPolicy {
    /// Swallow the failure once retries are exhausted.
    #[serde(default)]
    pub ignore_errors: bool,
    /// Retries after the first attempt; overrides the classified policy's attempt cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// Full policy override. Its rule is combined with (never replaces) the rule of
    /// the classified category, so a never-retry category stays never-retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
}

impl ErrorPolicy {
    pub fn ignoring() -> Self {
        Self {
            ignore_errors: true,
            ..Self::default()
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Applies this override on top of the policy attached to a classification.
    pub fn effective_policy(&self, classified: &RetryPolicy) -> RetryPolicy {
        let mut out = match &self.retry_policy {
            Some(p) => RetryPolicy {
                rule: classified.rule.clone().and(p.rule.clone()),
                ..p.clone()
            },
            None => classified.clone(),
        };
        if let Some(n) = self.retry_count {
            out.max_attempts = n.saturating_add(1);
        }
        out
    }
}

/// Serialized form of an [`Action`]; every deserialized action is validated through it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDef {
    pub id: String,
    #[serde(flatten)]
    pub spec: ActionSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub on_precondition_failure: PreconditionPolicy,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

/// A validated, immutable unit of work.
///
/// There is no way to mutate an `Action`; variations require building a new one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ActionDef", into = "ActionDef")]
pub struct Action {
    id: String,
    spec: ActionSpec,
    preconditions: Vec<Precondition>,
    precondition_policy: PreconditionPolicy,
    on_error: ErrorPolicy,
}

impl Action {
    pub fn new(id: impl Into<String>, spec: ActionSpec) -> Result<Self, ValidationError> {
        Self::builder(id, spec).build()
    }

    pub fn builder(id: impl Into<String>, spec: ActionSpec) -> ActionBuilder {
        ActionBuilder {
            def: ActionDef {
                id: id.into(),
                spec,
                preconditions: Vec::new(),
                on_precondition_failure: PreconditionPolicy::default(),
                on_error: ErrorPolicy::default(),
            },
        }
    }

    pub fn navigate(id: impl Into<String>, url: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(id, ActionSpec::Navigate { url: url.into() })
    }

    pub fn click(id: impl Into<String>, target: Target) -> Result<Self, ValidationError> {
        Self::new(id, ActionSpec::Click { target })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    pub fn kind(&self) -> ActionKind {
        self.spec.kind()
    }

    pub fn target(&self) -> Option<&Target> {
        self.spec.target()
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn precondition_policy(&self) -> PreconditionPolicy {
        self.precondition_policy
    }

    pub fn on_error(&self) -> &ErrorPolicy {
        &self.on_error
    }
}

impl TryFrom<ActionDef> for Action {
    type Error = ValidationError;

    fn try_from(def: ActionDef) -> Result<Self, Self::Error> {
        let mut v = Validator::new();
        v.validate_action("$", &def);
        v.finish()?;
        Ok(Self {
            id: def.id,
            spec: def.spec,
            preconditions: def.preconditions,
            precondition_policy: def.on_precondition_failure,
            on_error: def.on_error,
        })
    }
}

impl From<Action> for ActionDef {
    fn from(a: Action) -> Self {
        ActionDef {
            id: a.id,
            spec: a.spec,
            preconditions: a.preconditions,
            on_precondition_failure: a.precondition_policy,
            on_error: a.on_error,
        }
    }
}

pub struct ActionBuilder {
    def: ActionDef,
}

impl ActionBuilder {
    pub fn precondition(mut self, p: Precondition) -> Self {
        self.def.preconditions.push(p);
        self
    }

    pub fn on_precondition_failure(mut self, policy: PreconditionPolicy) -> Self {
        self.def.on_precondition_failure = policy;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.def.on_error = policy;
        self
    }

    pub fn build(self) -> Result<Action, ValidationError> {
        Action::try_from(self.def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::classification::ErrorCategory;

    #[test]
    fn effective_policy_keeps_category_rule() {
        let classified = RetryPolicy::no_retry();
        let policy = ErrorPolicy::default()
            .with_retry_policy(RetryPolicy::new(5, Duration::from_millis(10), 2.0));
        let eff = policy.effective_policy(&classified);
        assert_eq!(eff.max_attempts, 5);
        assert_eq!(eff.rule, RetryRule::Never.and(RetryRule::Always));
        assert_eq!(eff.rule, RetryRule::Never);
    }

    #[test]
    fn retry_count_sets_attempt_cap() {
        let eff = ErrorPolicy::default()
            .with_retry_count(2)
            .effective_policy(&RetryPolicy::default());
        assert_eq!(eff.max_attempts, 3);
    }

    #[test]
    fn combined_rules_all_apply() {
        let rule = RetryRule::Always
            .and(RetryRule::MaxAttempt { n: 4 })
            .and(RetryRule::UnlessCategory {
                categories: vec![ErrorCategory::Network],
            });
        assert!(matches!(rule, RetryRule::All { ref rules } if rules.len() == 2));
    }
}
