use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use steadfast_core::{
    classification_for, Action, ActionAttempt, ActionSpec, AttemptOutcome, CandidateLocator,
    ErrorCategory, ErrorClassification, ExecutionContext, LocatorSet, PageSnapshot, Precondition,
    PreconditionPolicy, RankContext, Strategy, TaskDefinition,
};
use steadfast_store::NewExperience;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::driver::{BrowserDriver, WaitTarget};
use crate::executor::call::{bounded, CallError};
use crate::executor::events::{Event, EventSink};
use crate::executor::result::{ActionFailure, ActionResult, EngineError};
use crate::executor::services::Services;
use crate::executor::side_effects::HANDLERS;
use crate::executor::types::EngineConfig;
use crate::retry::{
    run_auto_fix, AlternateCandidate, AutoFixHook, AutoFixRequest, PassAdjustments, RetryCoordinator,
    RetryDecision, RetryReason, WidenTimeout,
};
use crate::tracker::PerformanceTracker;

/// Where an action runs: which task, which site, how, and until when.
#[derive(Debug, Clone)]
pub struct RunScope {
    pub task_id: String,
    pub task_type: String,
    pub website: String,
    pub strategy: Strategy,
    pub deadline: Option<Instant>,
    /// Last URL navigated to.
    pub url: Option<String>,
}

impl RunScope {
    pub fn new(task_id: impl Into<String>, task_type: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            task_type: task_type.into(),
            website: website.into(),
            strategy: Strategy::Direct,
            deadline: None,
            url: None,
        }
    }

    pub fn for_task(task: &TaskDefinition) -> Self {
        let mut scope = Self::new(&task.task_id, &task.task_type, &task.website);
        if let Some(ms) = task.deadline_ms {
            scope.deadline = Some(Instant::now() + Duration::from_millis(ms));
        }
        scope
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

enum PassOutcome {
    Succeeded {
        candidate: CandidateLocator,
        index: usize,
        output: Option<String>,
    },
    Failed {
        classification: ErrorClassification,
        context: ExecutionContext,
        deadline_hit: bool,
    },
}

enum Preconditions {
    Met,
    Skip(String),
}

/// Turns one abstract action into driver calls: candidate chain, retries,
/// auto-fixes, post-navigation handlers. Sequential per task instance.
pub struct ExecutionEngine {
    services: Arc<Services>,
    config: EngineConfig,
    hooks: Vec<Arc<dyn AutoFixHook>>,
}

impl ExecutionEngine {
    pub fn new(services: Arc<Services>, config: EngineConfig) -> Self {
        let threshold = services
            .learning
            .config()
            .confidence_threshold
            .max(config.auto_fix.min_confidence);
        let hooks: Vec<Arc<dyn AutoFixHook>> = vec![
            Arc::new(WidenTimeout {
                factor: config.auto_fix.timeout_widening,
                max: config.max_call_timeout,
            }),
            Arc::new(AlternateCandidate {
                learning: services.learning.clone(),
                min_confidence: threshold,
            }),
        ];
        Self {
            services,
            config,
            hooks,
        }
    }

    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn AutoFixHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn execute(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        scope: &mut RunScope,
    ) -> Result<ActionResult, EngineError> {
        let started = Instant::now();
        let mut result = ActionResult::new(action.id(), action.kind());
        self.emit(Event::ActionStarted {
            task_id: scope.task_id.clone(),
            action_id: action.id().to_string(),
            kind: action.kind(),
        })
        .await;

        if let Preconditions::Skip(reason) = self.check_preconditions(action, driver, scope).await? {
            info!(action_id = action.id(), %reason, "precondition not met; skipping action");
            result.skipped = true;
            result.duration_ms = started.elapsed().as_millis() as u64;
            self.emit(Event::ActionSkipped {
                task_id: scope.task_id.clone(),
                action_id: action.id().to_string(),
                reason,
            })
            .await;
            return Ok(result);
        }

        let mut coord = RetryCoordinator::new(
            self.config.retry.clone(),
            action.on_error().clone(),
            scope.deadline,
        );
        let mut adj = PassAdjustments {
            call_timeout: self.config.call_timeout,
            extra_candidates: Vec::new(),
        };
        let mut tried: Vec<String> = Vec::new();

        loop {
            let pass = coord.pass();
            let candidates = self.plan(action, driver, scope, &adj).await;
            debug!(
                action_id = action.id(),
                pass,
                candidates = candidates.len(),
                "starting candidate chain"
            );
            let outcome = self
                .run_pass(action, driver, scope, &candidates, pass, adj.call_timeout, &mut result, &mut tried)
                .await;

            match outcome {
                PassOutcome::Succeeded {
                    candidate,
                    index,
                    output,
                } => {
                    coord.succeed();
                    if let ActionSpec::Navigate { url } = action.spec() {
                        scope.url = Some(url.clone());
                        if self.config.side_effects {
                            let notes = self.run_side_effects(driver, scope).await;
                            result.learnings.extend(notes);
                        }
                    }
                    let failures = result.attempts.iter().filter(|a| !a.succeeded()).count();
                    if failures > 0 {
                        let first = result
                            .attempts
                            .iter()
                            .find_map(|a| a.classification.as_ref())
                            .map(|c| c.category.as_str())
                            .unwrap_or("unknown");
                        result.learnings.push(format!(
                            "{} succeeded after {failures} failed attempt(s); first failure was {first}",
                            candidate.locator
                        ));
                    }
                    result.success = true;
                    result.passes = pass;
                    result.recovery_used = pass > 1 || index > 0;
                    result.winning_locator = Some(candidate);
                    result.output = output;
                    result.backoff_ms = delays_ms(coord.delays());
                    result.duration_ms = started.elapsed().as_millis() as u64;
                    self.emit(Event::ActionSucceeded {
                        task_id: scope.task_id.clone(),
                        action_id: action.id().to_string(),
                        attempts: result.attempts_used,
                        recovered: result.recovery_used,
                    })
                    .await;
                    return Ok(result);
                }
                PassOutcome::Failed {
                    classification,
                    context,
                    deadline_hit,
                } => {
                    result.passes = pass;
                    if deadline_hit || scope.deadline_passed() {
                        return Err(self.deadline_failure(action, scope, result, context, &coord).await);
                    }
                    match coord.fail(&classification) {
                        RetryDecision::RetryAfter { delay, .. } => {
                            self.emit(Event::RetryScheduled {
                                task_id: scope.task_id.clone(),
                                action_id: action.id().to_string(),
                                pass,
                                delay_ms: delay.as_millis() as u64,
                                category: classification.category,
                            })
                            .await;
                            if self.config.auto_fix.enabled {
                                let req = AutoFixRequest {
                                    action,
                                    website: &scope.website,
                                    task_type: &scope.task_type,
                                    classification: &classification,
                                    tried: &tried,
                                };
                                for (hook, note) in run_auto_fix(&self.hooks, &req, &mut adj).await {
                                    info!(action_id = action.id(), hook, %note, "auto-fix applied");
                                    result.learnings.push(format!("{hook}: {note}"));
                                    self.emit(Event::AutoFixApplied {
                                        task_id: scope.task_id.clone(),
                                        action_id: action.id().to_string(),
                                        hook: hook.to_string(),
                                        note,
                                    })
                                    .await;
                                }
                            }
                            coord.wait().await;
                        }
                        RetryDecision::Stop {
                            reason: RetryReason::DeadlineExceeded,
                        } => {
                            return Err(self.deadline_failure(action, scope, result, context, &coord).await);
                        }
                        RetryDecision::Stop { reason } => {
                            debug!(action_id = action.id(), reason = reason.as_str(), "retries exhausted");
                            return self
                                .exhausted(action, scope, result, classification, context, &coord, started)
                                .await;
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn exhausted(
        &self,
        action: &Action,
        scope: &RunScope,
        mut result: ActionResult,
        classification: ErrorClassification,
        context: ExecutionContext,
        coord: &RetryCoordinator,
        started: Instant,
    ) -> Result<ActionResult, EngineError> {
        let ignored = action.on_error().ignore_errors;
        self.emit(Event::ActionFailed {
            task_id: scope.task_id.clone(),
            action_id: action.id().to_string(),
            category: classification.category,
            ignored,
        })
        .await;
        if ignored {
            warn!(
                action_id = action.id(),
                category = %classification.category,
                "action failed; error ignored by policy"
            );
            result.ignored = true;
            result.classification = Some(classification);
            result.backoff_ms = delays_ms(coord.delays());
            result.duration_ms = started.elapsed().as_millis() as u64;
            return Ok(result);
        }
        warn!(
            action_id = action.id(),
            category = %classification.category,
            attempts = result.attempts_used,
            "action failed"
        );
        Err(EngineError::Exhausted(Box::new(ActionFailure {
            classification,
            attempts: result.attempts,
            context,
            backoff_ms: delays_ms(coord.delays()),
            learnings: result.learnings,
        })))
    }

    async fn deadline_failure(
        &self,
        action: &Action,
        scope: &RunScope,
        result: ActionResult,
        context: ExecutionContext,
        coord: &RetryCoordinator,
    ) -> EngineError {
        let classification = classification_for(
            ErrorCategory::Timeout,
            &format!("timeout: task deadline elapsed during action {}", action.id()),
        );
        warn!(action_id = action.id(), task_id = %scope.task_id, "task deadline elapsed");
        self.emit(Event::ActionFailed {
            task_id: scope.task_id.clone(),
            action_id: action.id().to_string(),
            category: classification.category,
            ignored: false,
        })
        .await;
        EngineError::DeadlineExceeded(Box::new(ActionFailure {
            classification,
            attempts: result.attempts,
            context,
            backoff_ms: delays_ms(coord.delays()),
            learnings: result.learnings,
        }))
    }

    /// Candidate list for one pass: auto-fix extras first, then each authored
    /// set in order, re-scored within the set.
    async fn plan(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        scope: &RunScope,
        adj: &PassAdjustments,
    ) -> Vec<CandidateLocator> {
        let Some(target) = action.target() else {
            let label = match action.spec() {
                ActionSpec::Navigate { url } => url.clone(),
                ActionSpec::Wait { duration, .. } => {
                    format!("wait:{}ms", duration.unwrap_or_default().as_millis())
                }
                _ => action.kind().as_str().to_string(),
            };
            return vec![CandidateLocator::page(label)];
        };

        let history = self
            .services
            .tracker
            .history_for(&scope.website, &scope.task_type)
            .await;
        let bias = self.services.learning.kind_bias(&scope.website).await;
        let ctx = RankContext::new(&scope.website, &scope.task_type)
            .with_history(history)
            .with_kind_bias(bias);

        let html = if self.config.snapshot_scoring {
            bounded(driver.get_content(), adj.call_timeout, scope.deadline)
                .await
                .ok()
        } else {
            None
        };

        let mut out: Vec<CandidateLocator> = adj.extra_candidates.clone();
        let snapshot = html.as_deref().map(PageSnapshot::parse);
        for set in target.sets() {
            for c in self.services.scorer.rescore(set, snapshot.as_ref(), &ctx) {
                if !out.iter().any(|o| o.locator == c.locator) {
                    out.push(c);
                }
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_pass(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        scope: &RunScope,
        candidates: &[CandidateLocator],
        pass: u32,
        timeout: Duration,
        result: &mut ActionResult,
        tried: &mut Vec<String>,
    ) -> PassOutcome {
        let mut logs: Vec<String> = Vec::new();
        let mut last: Option<(ErrorClassification, ExecutionContext)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let mut ctx = self.context(action, scope, candidate);
            let started_at = Utc::now();
            let t0 = Instant::now();
            let r = self.perform(action, driver, candidate, timeout, scope).await;
            let latency = t0.elapsed();

            match r {
                Ok(output) => {
                    let attempt = ActionAttempt {
                        action_id: action.id().to_string(),
                        candidate: candidate.clone(),
                        chain_pass: pass,
                        candidate_index: index,
                        started_at,
                        outcome: AttemptOutcome::Success,
                        latency,
                        classification: None,
                    };
                    self.observe(&attempt, action, scope).await;
                    result.attempts.push(attempt);
                    result.attempts_used += 1;
                    return PassOutcome::Succeeded {
                        candidate: candidate.clone(),
                        index,
                        output,
                    };
                }
                Err(e) => {
                    let raw = e.message();
                    logs.push(format!("{}: {raw}", candidate.locator));
                    ctx.logs = logs.clone();
                    let classification = self.services.classifier.classify(&raw, &ctx);
                    debug!(
                        action_id = action.id(),
                        locator = %candidate.locator,
                        category = %classification.category,
                        "candidate failed"
                    );
                    let attempt = ActionAttempt {
                        action_id: action.id().to_string(),
                        candidate: candidate.clone(),
                        chain_pass: pass,
                        candidate_index: index,
                        started_at,
                        outcome: AttemptOutcome::Failure,
                        latency,
                        classification: Some(classification.clone()),
                    };
                    self.observe(&attempt, action, scope).await;
                    result.attempts.push(attempt);
                    result.attempts_used += 1;
                    if !tried.contains(&candidate.locator) {
                        tried.push(candidate.locator.clone());
                    }

                    if e.is_deadline() {
                        return PassOutcome::Failed {
                            classification,
                            context: ctx,
                            deadline_hit: true,
                        };
                    }
                    let aborts = classification.category.aborts_chain();
                    last = Some((classification, ctx));
                    if aborts {
                        info!(action_id = action.id(), "chain aborted by critical failure");
                        break;
                    }
                }
            }
        }

        let (classification, context) = last.unwrap_or_else(|| {
            let ctx = ExecutionContext::new(&scope.task_id, action.id(), action.kind());
            (
                classification_for(ErrorCategory::SelectorNotFound, "no candidate locators to try"),
                ctx,
            )
        });
        PassOutcome::Failed {
            classification,
            context,
            deadline_hit: false,
        }
    }

    fn context(&self, action: &Action, scope: &RunScope, candidate: &CandidateLocator) -> ExecutionContext {
        let mut ctx = ExecutionContext::new(&scope.task_id, action.id(), action.kind());
        if let Some(url) = &scope.url {
            ctx = ctx.with_url(url.clone());
        }
        if action.target().is_some() {
            ctx = ctx.with_selector(candidate.locator.clone());
        }
        ctx
    }

    async fn perform(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        candidate: &CandidateLocator,
        timeout: Duration,
        scope: &RunScope,
    ) -> Result<Option<String>, CallError> {
        let deadline = scope.deadline;
        let locator = candidate.locator.as_str();
        match action.spec() {
            ActionSpec::Navigate { url } => bounded(driver.navigate(url), timeout, deadline)
                .await
                .map(|_| None),
            ActionSpec::Screenshot => bounded(driver.screenshot(), timeout, deadline)
                .await
                .map(Some),
            ActionSpec::Wait {
                target: None,
                duration,
            } => {
                let d = duration.unwrap_or_default();
                bounded(driver.wait_for(WaitTarget::Duration(d)), d + timeout, deadline)
                    .await
                    .map(|_| None)
            }
            ActionSpec::Wait {
                target: Some(_),
                duration,
            } => {
                let wait = duration.unwrap_or(timeout);
                let target = WaitTarget::Element {
                    locator: locator.to_string(),
                    timeout: wait,
                };
                bounded(driver.wait_for(target), wait.max(timeout), deadline)
                    .await
                    .map(|_| None)
            }
            ActionSpec::Click { .. } => {
                self.prepare(driver, locator, timeout, scope).await?;
                bounded(driver.click(locator), timeout, deadline)
                    .await
                    .map(|_| None)
            }
            ActionSpec::Type { text, clear, .. } => {
                self.prepare(driver, locator, timeout, scope).await?;
                bounded(driver.type_text(locator, text, *clear), timeout, deadline)
                    .await
                    .map(|_| None)
            }
            ActionSpec::Extract { attribute, .. } => {
                self.prepare(driver, locator, timeout, scope).await?;
                bounded(driver.extract(locator, attribute.as_deref()), timeout, deadline)
                    .await
                    .map(Some)
            }
        }
    }

    /// Strategy-specific lead-in before acting on an element.
    async fn prepare(
        &self,
        driver: &dyn BrowserDriver,
        locator: &str,
        timeout: Duration,
        scope: &RunScope,
    ) -> Result<(), CallError> {
        match scope.strategy {
            Strategy::Direct => Ok(()),
            Strategy::WaitThenAct => {
                let target = WaitTarget::Element {
                    locator: locator.to_string(),
                    timeout,
                };
                bounded(driver.wait_for(target), timeout, scope.deadline).await
            }
            Strategy::SettleThenAct => {
                let until = Instant::now() + self.config.settle_pause;
                match scope.deadline {
                    Some(d) if d <= until => {
                        tokio::time::sleep_until(d).await;
                        Err(CallError::Deadline)
                    }
                    _ => {
                        tokio::time::sleep_until(until).await;
                        Ok(())
                    }
                }
            }
        }
    }

    async fn check_preconditions(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        scope: &RunScope,
    ) -> Result<Preconditions, EngineError> {
        if action.preconditions().is_empty() {
            return Ok(Preconditions::Met);
        }
        let policy = action.precondition_policy();
        let mut retries = 0u32;
        loop {
            let Some((unmet, category)) = self.first_unmet(action, driver, scope).await else {
                return Ok(Preconditions::Met);
            };
            match policy {
                PreconditionPolicy::Continue => {
                    warn!(action_id = action.id(), %unmet, "precondition not met; continuing");
                    return Ok(Preconditions::Met);
                }
                PreconditionPolicy::Skip => return Ok(Preconditions::Skip(unmet)),
                PreconditionPolicy::Retry if retries < self.config.precondition_retries => {
                    let delay = self.config.precondition_backoff * 2u32.saturating_pow(retries);
                    if scope
                        .deadline
                        .is_some_and(|d| Instant::now() + delay >= d)
                    {
                        return Err(self.precondition_failure(action, scope, unmet, category).await);
                    }
                    debug!(action_id = action.id(), %unmet, retry = retries + 1, "re-checking precondition");
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                PreconditionPolicy::Retry | PreconditionPolicy::Fail => {
                    return Err(self.precondition_failure(action, scope, unmet, category).await);
                }
            }
        }
    }

    async fn precondition_failure(
        &self,
        action: &Action,
        scope: &RunScope,
        unmet: String,
        category: ErrorCategory,
    ) -> EngineError {
        let classification = classification_for(category, &format!("precondition not met: {unmet}"));
        self.emit(Event::ActionFailed {
            task_id: scope.task_id.clone(),
            action_id: action.id().to_string(),
            category,
            ignored: false,
        })
        .await;
        let mut context = ExecutionContext::new(&scope.task_id, action.id(), action.kind());
        if let Some(url) = &scope.url {
            context = context.with_url(url.clone());
        }
        context.log(unmet);
        EngineError::PreconditionFailed(Box::new(ActionFailure {
            classification,
            attempts: Vec::new(),
            context,
            backoff_ms: Vec::new(),
            learnings: Vec::new(),
        }))
    }

    /// Description and category of the first precondition that does not hold.
    async fn first_unmet(
        &self,
        action: &Action,
        driver: &dyn BrowserDriver,
        scope: &RunScope,
    ) -> Option<(String, ErrorCategory)> {
        for p in action.preconditions() {
            match p {
                Precondition::ElementPresent { locator } => {
                    let target = WaitTarget::Element {
                        locator: locator.clone(),
                        timeout: self.config.precondition_timeout,
                    };
                    let bound = self.config.precondition_timeout + self.config.call_timeout;
                    if bounded(driver.wait_for(target), bound, scope.deadline).await.is_err() {
                        return Some((
                            format!("element {locator} not present"),
                            ErrorCategory::SelectorNotFound,
                        ));
                    }
                }
                Precondition::TextPresent { text } => {
                    let html = bounded(driver.get_content(), self.config.call_timeout, scope.deadline)
                        .await
                        .ok();
                    let present = html.is_some_and(|h| PageSnapshot::parse(&h).contains_text(text));
                    if !present {
                        return Some((format!("text {text:?} not present"), ErrorCategory::Unknown));
                    }
                }
            }
        }
        None
    }

    /// Best-effort post-navigation handlers. Failures are logged, never raised.
    async fn run_side_effects(&self, driver: &dyn BrowserDriver, scope: &RunScope) -> Vec<String> {
        let timeout = self.config.side_effect_timeout;
        let html = match bounded(driver.get_content(), timeout, scope.deadline).await {
            Ok(html) => Some(html),
            Err(e) => {
                debug!(error = %e.message(), "could not read page for post-navigation handlers");
                None
            }
        };

        let ctx = RankContext::new(&scope.website, &scope.task_type);
        let plans: Vec<(&'static str, Vec<String>)> = {
            let snapshot = html.as_deref().map(PageSnapshot::parse);
            HANDLERS
                .iter()
                .map(|h| {
                    let set = LocatorSet::from_strs(h.locators.iter().copied());
                    let present: Vec<String> = self
                        .services
                        .scorer
                        .rescore(&set, None, &ctx)
                        .into_iter()
                        .map(|c| c.locator)
                        .filter(|l| match &snapshot {
                            Some(s) => s.count(l).map_or(true, |n| n > 0),
                            None => true,
                        })
                        .collect();
                    (h.name, present)
                })
                .collect()
        };

        let mut notes = Vec::new();
        for (name, locators) in plans {
            for locator in locators {
                if scope.deadline_passed() {
                    return notes;
                }
                match bounded(driver.click(&locator), timeout, scope.deadline).await {
                    Ok(()) => {
                        debug!(handler = name, %locator, "post-navigation handler applied");
                        notes.push(format!("{name}: clicked {locator}"));
                        self.emit(Event::SideEffectHandled {
                            task_id: scope.task_id.clone(),
                            handler: name.to_string(),
                            locator,
                        })
                        .await;
                        break;
                    }
                    Err(e) => {
                        debug!(handler = name, %locator, error = %e.message(), "post-navigation handler candidate failed");
                    }
                }
            }
        }
        notes
    }

    async fn observe(&self, attempt: &ActionAttempt, action: &Action, scope: &RunScope) {
        let services = &self.services;
        services
            .tracker
            .record(attempt, &scope.website, &scope.task_type)
            .await;

        let strategy = action.target().map(|_| scope.strategy);
        let exp = PerformanceTracker::experience_from(
            attempt,
            &scope.website,
            &scope.task_type,
            scope.url.as_deref(),
            strategy,
        );
        services.learning.observe(&exp).await;

        if let Some(store) = &services.store {
            match serde_json::to_value(&exp) {
                Ok(payload) => {
                    let row = NewExperience {
                        id: exp.id.clone(),
                        website: exp.website.clone(),
                        task_type: exp.task_type.clone(),
                        payload,
                        recorded_at: exp.recorded_at,
                    };
                    if let Err(e) = store.append_experience(row).await {
                        warn!(error = %e, "could not persist experience");
                    }
                }
                Err(e) => warn!(error = %e, "could not encode experience"),
            }
        }

        self.emit(Event::AttemptFinished {
            task_id: scope.task_id.clone(),
            action_id: attempt.action_id.clone(),
            pass: attempt.chain_pass,
            locator: attempt.candidate.locator.clone(),
            succeeded: attempt.succeeded(),
            latency_ms: attempt.latency.as_millis() as u64,
            category: attempt.classification.as_ref().map(|c| c.category),
        })
        .await;
    }

    async fn emit(&self, event: Event) {
        self.services.events.emit(event).await;
    }
}

fn delays_ms(delays: &[Duration]) -> Vec<u64> {
    delays.iter().map(|d| d.as_millis() as u64).collect()
}
