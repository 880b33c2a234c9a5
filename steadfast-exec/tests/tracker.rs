use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use steadfast_core::{
    classification_for, ActionAttempt, AttemptOutcome, CandidateLocator, ErrorCategory, LocatorKind,
};
use steadfast_exec::tracker::{Reliability, Trend};
use steadfast_exec::{PerformanceTracker, TrackerConfig};
use steadfast_store::{InMemoryStore, ModelStore};

fn attempt(locator: &str, success: bool, latency_ms: u64) -> ActionAttempt {
    ActionAttempt {
        action_id: "submit".to_string(),
        candidate: CandidateLocator::new(locator, LocatorKind::infer(locator), 0.5),
        chain_pass: 1,
        candidate_index: 0,
        started_at: Utc::now(),
        outcome: if success {
            AttemptOutcome::Success
        } else {
            AttemptOutcome::Failure
        },
        latency: Duration::from_millis(latency_ms),
        classification: (!success)
            .then(|| classification_for(ErrorCategory::SelectorNotFound, "no such element")),
    }
}

#[tokio::test]
async fn collapsing_selector_is_flagged_as_degrading() {
    let tracker = PerformanceTracker::default();
    for _ in 0..100 {
        tracker.record(&attempt("#login", true, 120), "shop.test", "login").await;
    }
    for _ in 0..100 {
        tracker.record(&attempt("#login", false, 120), "shop.test", "login").await;
    }

    let m = tracker.query("#login", "shop.test", "login").await.unwrap();
    assert_eq!(m.total_attempts, 200);
    assert_eq!(m.success_count + m.failure_count, m.total_attempts);
    assert!((m.success_rate - 0.5).abs() < 1e-9);
    assert_eq!(m.trend, Trend::Degrading);
    assert!(m.degradation_rate > 0.9);
    assert!(!m.is_reliable());
}

#[tokio::test]
async fn steady_fast_selector_is_reliable() {
    let tracker = PerformanceTracker::default();
    for _ in 0..20 {
        tracker.record(&attempt("#email", true, 100), "shop.test", "login").await;
    }
    let m = tracker.query("#email", "shop.test", "login").await.unwrap();
    assert_eq!(m.reliability, Reliability::Reliable);
    assert_eq!(m.trend, Trend::Stable);
    assert!(m.stability > 0.99);
    assert_eq!(m.min_latency_ms, 100);
    assert_eq!(m.max_latency_ms, 100);
}

#[tokio::test]
async fn few_samples_give_no_verdict() {
    let tracker = PerformanceTracker::default();
    for _ in 0..5 {
        tracker.record(&attempt("#email", true, 100), "shop.test", "login").await;
    }
    let m = tracker.query("#email", "shop.test", "login").await.unwrap();
    assert_eq!(m.reliability, Reliability::InsufficientData);
    assert!(!m.is_reliable());
}

#[tokio::test]
async fn window_bounds_rates_but_not_lifetime_counts() {
    let tracker = PerformanceTracker::new(TrackerConfig {
        window: 50,
        ..TrackerConfig::default()
    });
    for _ in 0..100 {
        tracker.record(&attempt("#buy", false, 80), "shop.test", "checkout").await;
    }
    for _ in 0..50 {
        tracker.record(&attempt("#buy", true, 80), "shop.test", "checkout").await;
    }
    let m = tracker.query("#buy", "shop.test", "checkout").await.unwrap();
    assert_eq!(m.total_attempts, 150);
    assert_eq!(m.failure_count, 100);
    assert_eq!(m.window_size, 50);
    assert_eq!(m.success_rate, 1.0);
}

#[tokio::test]
async fn keys_are_scoped_by_site_and_task_type() {
    let tracker = PerformanceTracker::default();
    tracker.record(&attempt("#go", true, 10), "a.test", "login").await;
    tracker.record(&attempt("#go", false, 10), "b.test", "login").await;
    tracker.record(&attempt("#go", false, 10), "a.test", "search").await;

    assert_eq!(tracker.query("#go", "a.test", "login").await.unwrap().success_rate, 1.0);
    assert_eq!(tracker.query("#go", "b.test", "login").await.unwrap().success_rate, 0.0);
    assert!(tracker.query("#go", "c.test", "login").await.is_none());

    let history = tracker.history_for("a.test", "login").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history.get("#go"), Some(&1.0));

    let all = tracker.snapshot().await;
    let order: Vec<(&str, &str)> = all.iter().map(|m| (m.website.as_str(), m.task_type.as_str())).collect();
    assert_eq!(order, vec![("a.test", "login"), ("a.test", "search"), ("b.test", "login")]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_are_never_lost() {
    let tracker = Arc::new(PerformanceTracker::default());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                for j in 0..50 {
                    let ok = (i + j) % 3 != 0;
                    tracker.record(&attempt("#shared", ok, 5), "shop.test", "login").await;
                }
            })
        })
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    let m = tracker.query("#shared", "shop.test", "login").await.unwrap();
    assert_eq!(m.total_attempts, 800);
    assert_eq!(m.success_count + m.failure_count, 800);
}

#[tokio::test]
async fn snapshot_persists_to_store() {
    let tracker = PerformanceTracker::default();
    tracker.record(&attempt("#a", true, 10), "shop.test", "login").await;
    tracker.record(&attempt("#b", false, 10), "shop.test", "login").await;
    let store = InMemoryStore::new();

    assert_eq!(tracker.persist(&store).await.unwrap(), 2);

    let rows = store.load_metric_snapshots(Some("shop.test")).await.unwrap();
    assert_eq!(rows.len(), 2);
    let a = rows.iter().find(|r| r.locator == "#a").unwrap();
    assert_eq!(a.metric["successRate"], 1.0);
    assert_eq!(a.metric["trend"], "stable");
}

#[tokio::test]
async fn empty_tracker_writes_nothing() {
    let store = InMemoryStore::new();
    assert_eq!(PerformanceTracker::default().persist(&store).await.unwrap(), 0);
    assert!(store.load_metric_snapshots(None).await.unwrap().is_empty());
}
