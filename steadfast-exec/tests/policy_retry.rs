use std::sync::Arc;
use std::time::Duration;

use steadfast_core::{Action, ActionSpec, ErrorCategory, ErrorPolicy, RetryPolicy, Target};
use steadfast_exec::driver::{Op, Reply, ScriptedDriver};
use steadfast_exec::executor::{Event, RecordingEventSink};
use steadfast_exec::{EngineConfig, EngineError, ExecutionEngine, RunScope, Services};
use tokio::time::Instant;

fn engine_with(config: EngineConfig) -> (Arc<Services>, ExecutionEngine) {
    let services = Arc::new(Services::default());
    let engine = ExecutionEngine::new(services.clone(), config);
    (services, engine)
}

fn scope() -> RunScope {
    RunScope::new("task-1", "checkout", "shop.test")
}

fn click(locator: &str) -> Action {
    Action::click("pay", Target::locator(locator)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn timeouts_back_off_geometrically_until_exhausted() {
    let (services, engine) = engine_with(EngineConfig::default());
    let sink = Arc::new(RecordingEventSink::new());
    let _sub = services.events.subscribe(sink.clone()).await;
    let driver = ScriptedDriver::new().always(
        Op::Click,
        "#pay",
        Reply::err("Timeout 30000ms exceeded waiting for element"),
    );

    let started = Instant::now();
    let err = engine.execute(&click("#pay"), &driver, &mut scope()).await.unwrap_err();

    let EngineError::Exhausted(failure) = &err else {
        panic!("expected exhaustion, got {err:?}");
    };
    assert_eq!(failure.classification.category, ErrorCategory::Timeout);
    assert_eq!(failure.attempts.len(), 3);
    assert_eq!(failure.backoff_ms, vec![1000, 2000]);
    assert!(started.elapsed() >= Duration::from_millis(3000));

    let retries: Vec<u64> = sink
        .events()
        .await
        .into_iter()
        .filter_map(|e| match e {
            Event::RetryScheduled { delay_ms, .. } => Some(delay_ms),
            _ => None,
        })
        .collect();
    assert_eq!(retries, vec![1000, 2000]);
}

#[tokio::test(start_paused = true)]
async fn hanging_driver_call_is_cut_off_and_classified_as_timeout() {
    let (_, engine) = engine_with(EngineConfig {
        call_timeout: Duration::from_secs(1),
        ..EngineConfig::default()
    });
    let driver = ScriptedDriver::new().always(Op::Click, "#pay", Reply::Hang);
    let action = Action::builder(
        "pay",
        ActionSpec::Click {
            target: Target::locator("#pay"),
        },
    )
    .on_error(ErrorPolicy::default().with_retry_count(0))
    .build()
    .unwrap();

    let err = engine.execute(&action, &driver, &mut scope()).await.unwrap_err();

    assert!(matches!(err, EngineError::Exhausted(_)));
    assert_eq!(err.classification().category, ErrorCategory::Timeout);
    assert_eq!(err.failure().attempts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn task_deadline_interrupts_a_hanging_call() {
    let (_, engine) = engine_with(EngineConfig::default());
    let driver = ScriptedDriver::new().always(Op::Click, "#pay", Reply::Hang);
    let mut scope = scope().with_deadline(Instant::now() + Duration::from_millis(500));

    let started = Instant::now();
    let err = engine.execute(&click("#pay"), &driver, &mut scope).await.unwrap_err();

    assert!(matches!(err, EngineError::DeadlineExceeded(_)));
    assert_eq!(err.classification().category, ErrorCategory::Timeout);
    assert!(started.elapsed() < EngineConfig::default().call_timeout);
}

#[tokio::test(start_paused = true)]
async fn backoff_that_would_cross_the_deadline_stops_early() {
    let (_, engine) = engine_with(EngineConfig {
        call_timeout: Duration::from_secs(1),
        ..EngineConfig::default()
    });
    let driver = ScriptedDriver::new().always(Op::Click, "#pay", Reply::Hang);
    let mut scope = scope().with_deadline(Instant::now() + Duration::from_millis(1500));

    let err = engine.execute(&click("#pay"), &driver, &mut scope).await.unwrap_err();

    assert!(matches!(err, EngineError::DeadlineExceeded(_)));
    assert_eq!(err.failure().attempts.len(), 1);
    assert!(err.failure().backoff_ms.is_empty());
}

#[tokio::test(start_paused = true)]
async fn ignored_errors_yield_a_failed_result() {
    let (_, engine) = engine_with(EngineConfig::default());
    let driver = ScriptedDriver::new();
    let action = Action::builder(
        "newsletter",
        ActionSpec::Click {
            target: Target::locator("#newsletter-close"),
        },
    )
    .on_error(ErrorPolicy::ignoring())
    .build()
    .unwrap();

    let r = engine.execute(&action, &driver, &mut scope()).await.unwrap();

    assert!(!r.success);
    assert!(r.ignored);
    assert_eq!(
        r.classification.as_ref().map(|c| c.category),
        Some(ErrorCategory::SelectorNotFound)
    );
    assert_eq!(r.attempts_used, 3);
    assert_eq!(r.backoff_ms, vec![500, 750]);
}

#[tokio::test(start_paused = true)]
async fn network_failures_on_navigate_follow_network_policy() {
    let (_, engine) = engine_with(EngineConfig::default());
    let url = "https://shop.test/cart";
    let driver = ScriptedDriver::new().always(Op::Navigate, url, Reply::err("net::ERR_NAME_NOT_RESOLVED"));
    let action = Action::navigate("cart", url).unwrap();

    let err = engine.execute(&action, &driver, &mut scope()).await.unwrap_err();

    assert_eq!(err.classification().category, ErrorCategory::Network);
    assert_eq!(err.failure().attempts.len(), 2);
    assert_eq!(err.failure().backoff_ms, vec![5000]);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_navigate_failure_counts_as_navigation() {
    let (_, engine) = engine_with(EngineConfig::default());
    let url = "https://shop.test/cart";
    let driver = ScriptedDriver::new().always(Op::Navigate, url, Reply::err("renderer went away"));
    let action = Action::navigate("cart", url).unwrap();

    let err = engine.execute(&action, &driver, &mut scope()).await.unwrap_err();
    assert_eq!(err.classification().category, ErrorCategory::Navigation);
}

#[tokio::test(start_paused = true)]
async fn per_action_policy_replaces_category_timing() {
    let (_, engine) = engine_with(EngineConfig::default());
    let driver = ScriptedDriver::new()
        .fail(Op::Click, "#pay", "element not found")
        .succeed(Op::Click, "#pay");
    let action = Action::builder(
        "pay",
        ActionSpec::Click {
            target: Target::locator("#pay"),
        },
    )
    .on_error(ErrorPolicy::default().with_retry_policy(RetryPolicy::new(2, Duration::from_millis(50), 1.0)))
    .build()
    .unwrap();

    let r = engine.execute(&action, &driver, &mut scope()).await.unwrap();

    assert!(r.success);
    assert_eq!(r.passes, 2);
    assert_eq!(r.backoff_ms, vec![50]);
}
