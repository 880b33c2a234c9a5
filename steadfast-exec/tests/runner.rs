use std::sync::Arc;

use chrono::Utc;
use steadfast_core::{Action, ActionSpec, Experience, LocatorKind, Strategy, TaskDefinition, Target};
use steadfast_exec::driver::{Op, Reply, ScriptedDriver, ScriptedDriverFactory};
use steadfast_exec::executor::{
    MetricsCollector, MetricsEventSink, NoOpEventSink, PoolConfig, START_ACTION_ID,
};
use steadfast_exec::{
    EngineConfig, ExecutionEngine, LearningConfig, Services, TaskPool, TaskRunner, TrackerConfig,
};
use steadfast_store::{InMemoryStore, ModelStore};

fn runner(services: Services) -> TaskRunner {
    let engine = ExecutionEngine::new(Arc::new(services), EngineConfig::default());
    TaskRunner::new(Arc::new(engine))
}

fn login_task(id: &str) -> TaskDefinition {
    TaskDefinition::new(
        id,
        "login",
        "shop.test",
        vec![
            Action::new(
                "email",
                ActionSpec::Type {
                    target: Target::locator("#email"),
                    text: "user@shop.test".to_string(),
                    clear: true,
                },
            )
            .unwrap(),
            Action::click("submit", Target::locator("#login-btn")).unwrap(),
        ],
    )
    .with_start_url("https://shop.test/login")
}

fn happy_driver() -> ScriptedDriver {
    ScriptedDriver::new()
        .succeed(Op::Type, "#email")
        .succeed(Op::Click, "#login-btn")
}

#[tokio::test]
async fn start_url_becomes_the_first_action() {
    let runner = runner(Services::default());
    let driver = happy_driver();

    let report = runner.run(&login_task("t1"), &driver).await;

    assert!(report.success);
    assert!(report.failure.is_none());
    let ids: Vec<&str> = report.results.iter().map(|r| r.action_id.as_str()).collect();
    assert_eq!(ids, vec![START_ACTION_ID, "email", "submit"]);
    assert_eq!(
        driver.targets(Op::Navigate).await,
        vec!["https://shop.test/login".to_string()]
    );
    assert_eq!(report.strategy, Strategy::Direct);
}

#[tokio::test(start_paused = true)]
async fn first_failing_action_stops_the_task() {
    let runner = runner(Services::default());
    let driver = ScriptedDriver::new()
        .always(Op::Type, "#email", Reply::err("401 Unauthorized"))
        .succeed(Op::Click, "#login-btn");

    let report = runner.run(&login_task("t1"), &driver).await;

    assert!(!report.success);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.action_id, "email");
    assert_eq!(failure.reason, "exhausted");
    assert!(report.result("submit").is_none());
    assert!(driver.targets(Op::Click).await.is_empty());
}

#[tokio::test]
async fn run_persists_learning_and_metrics() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(Services::default().with_store(store.clone()));

    let report = runner.run(&login_task("t1"), &happy_driver()).await;
    assert!(report.success);

    let model = store.load_model("shop.test").await.unwrap().unwrap();
    assert_eq!(model.version, 1);
    assert!(!store.load_metric_snapshots(Some("shop.test")).await.unwrap().is_empty());
    // One experience per attempt: navigate, type, click.
    assert_eq!(store.list_experiences("shop.test", 10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn persistence_can_be_switched_off() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(Services::default().with_store(store.clone())).with_persist(false);

    runner.run(&login_task("t1"), &happy_driver()).await;
    assert!(store.load_model("shop.test").await.unwrap().is_none());
}

#[tokio::test]
async fn confident_learned_strategy_is_used() {
    let services = Services::default();
    for _ in 0..6 {
        services
            .learning
            .observe(&Experience {
                id: uuid::Uuid::new_v4().to_string(),
                locator: "#login-btn".to_string(),
                locator_kind: LocatorKind::Attribute,
                success: true,
                website: "shop.test".to_string(),
                task_type: "login".to_string(),
                action_id: Some("submit".to_string()),
                url: None,
                strategy: Some(Strategy::WaitThenAct),
                recorded_at: Utc::now(),
            })
            .await;
    }
    let runner = runner(services);

    let report = runner.run(&login_task("t1"), &happy_driver()).await;
    assert_eq!(report.strategy, Strategy::WaitThenAct);

    let pinned = login_task("t2").with_strategy(Strategy::Direct);
    let report = runner.run(&pinned, &happy_driver()).await;
    assert_eq!(report.strategy, Strategy::Direct);
}

fn exploring(rate: f64) -> Services {
    Services::new(
        TrackerConfig::default(),
        LearningConfig {
            exploration_rate: rate,
            ..LearningConfig::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn unconfident_history_explores_under_sampled_strategies() {
    let runner = runner(exploring(1.0));

    // No history yet: nothing to compare against.
    let first = runner.run(&login_task("t1"), &happy_driver()).await;
    assert_eq!(first.strategy, Strategy::Direct);

    let second = runner.run(&login_task("t2"), &happy_driver()).await;
    assert_eq!(second.strategy, Strategy::WaitThenAct);
    let third = runner.run(&login_task("t3"), &happy_driver()).await;
    assert_eq!(third.strategy, Strategy::SettleThenAct);
    assert!(third.success);

    let model = runner.engine().services().learning.model("shop.test").await.unwrap();
    let sampled = &model.strategies["login"];
    for s in Strategy::ALL {
        assert_eq!(sampled[s.as_str()].observations, 2, "{s}");
    }
}

#[tokio::test]
async fn exploration_can_be_switched_off() {
    let runner = runner(exploring(0.0));
    for id in ["t1", "t2", "t3"] {
        let report = runner.run(&login_task(id), &happy_driver()).await;
        assert_eq!(report.strategy, Strategy::Direct);
    }
}

#[tokio::test(start_paused = true)]
async fn run_metrics_follow_the_events() {
    let services = Services::default();
    let collector = Arc::new(MetricsCollector::new("t1"));
    let _sub = services
        .events
        .subscribe(Arc::new(MetricsEventSink::new(
            collector.clone(),
            Arc::new(NoOpEventSink),
        )))
        .await;
    let runner = runner(services);
    let driver = ScriptedDriver::new()
        .fail(Op::Type, "#email", "element not found")
        .succeed(Op::Type, "#email")
        .succeed(Op::Click, "#login-btn");

    let report = runner.run(&login_task("t1"), &driver).await;
    assert!(report.success);

    let m = collector.get_metrics().await;
    assert_eq!(m.success, Some(true));
    assert_eq!(m.actions_total, 3);
    assert_eq!(m.actions_succeeded, 3);
    assert_eq!(m.actions_recovered, 1);
    assert_eq!(m.attempts, 4);
    assert_eq!(m.attempt_failures, 1);
    assert_eq!(m.retries, 1);
}

#[tokio::test]
async fn pool_runs_every_task_and_keeps_input_order() {
    let services = Services::default();
    let engine = Arc::new(ExecutionEngine::new(Arc::new(services), EngineConfig::default()));
    let runner = Arc::new(TaskRunner::new(engine));
    let factory = ScriptedDriverFactory::new(happy_driver());
    let pool = TaskPool::new(
        runner,
        &PoolConfig {
            global_concurrency: 2,
            ..PoolConfig::default()
        },
        Arc::new(factory.clone()),
    );

    let tasks: Vec<_> = (0..5).map(|i| login_task(&format!("t{i}"))).collect();
    let reports = pool.run_all(tasks).await;

    assert_eq!(reports.len(), 5);
    for (i, r) in reports.iter().enumerate() {
        let r = r.as_ref().unwrap();
        assert_eq!(r.task_id, format!("t{i}"));
        assert!(r.success);
    }
    assert_eq!(factory.driver().targets(Op::Navigate).await.len(), 5);
}
