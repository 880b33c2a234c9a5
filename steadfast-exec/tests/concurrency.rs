use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use steadfast_core::ErrorCategory;
use steadfast_exec::executor::{
    CompositeEventSink, ConcurrencyLimits, Event, EventBus, EventSink, NoOpEventSink,
    RecordingEventSink,
};

#[tokio::test]
async fn concurrency_limits_enforce_global_limit() {
    let limits = ConcurrencyLimits::new(2, &BTreeMap::new());

    let permit1 = limits.acquire(None).await.unwrap();
    let _permit2 = limits.acquire(None).await.unwrap();
    assert_eq!(limits.available(), 0);

    let start = std::time::Instant::now();
    let waiter = {
        let limits = limits.clone();
        tokio::spawn(async move { limits.acquire(None).await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());
    drop(permit1);
    waiter.await.unwrap().unwrap();
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn concurrency_limits_enforce_per_website_limit() {
    let mut per_site = BTreeMap::new();
    per_site.insert("shop.test".to_string(), 1);
    let limits = ConcurrencyLimits::new(10, &per_site);

    let permit1 = limits.acquire(Some("shop.test")).await.unwrap();
    // Unlisted sites only share the global bound.
    let _other = limits.acquire(Some("news.test")).await.unwrap();

    let second = tokio::time::timeout(Duration::from_millis(50), limits.acquire(Some("shop.test"))).await;
    assert!(second.is_err());

    drop(permit1);
    assert!(limits.acquire(Some("shop.test")).await.is_ok());
}

#[tokio::test]
async fn zero_limit_is_treated_as_one() {
    let limits = ConcurrencyLimits::new(0, &BTreeMap::new());
    assert_eq!(limits.available(), 1);
}

fn finished(task_id: &str) -> Event {
    Event::TaskFinished {
        task_id: task_id.to_string(),
        success: true,
    }
}

#[tokio::test]
async fn bus_fans_out_until_unsubscribed() {
    let bus = EventBus::new();
    let a = Arc::new(RecordingEventSink::new());
    let b = Arc::new(RecordingEventSink::new());
    let sub_a = bus.subscribe(a.clone()).await;
    let _sub_b = bus.subscribe(b.clone()).await;
    assert_eq!(bus.subscriber_count().await, 2);

    bus.emit(finished("t1")).await;
    assert!(bus.unsubscribe(sub_a).await);
    bus.emit(finished("t2")).await;

    assert_eq!(a.events().await, vec![finished("t1")]);
    assert_eq!(b.events().await, vec![finished("t1"), finished("t2")]);
    assert_eq!(bus.subscriber_count().await, 1);
}

#[tokio::test]
async fn composite_forwards_to_every_sink() {
    let recorder = Arc::new(RecordingEventSink::new());
    let bus = EventBus::new();
    let _sub = bus.subscribe(recorder.clone()).await;

    let mut composite = CompositeEventSink::new();
    composite.add(Box::new(NoOpEventSink));
    composite.add(Box::new(bus));
    composite
        .emit(Event::ActionFailed {
            task_id: "t1".to_string(),
            action_id: "submit".to_string(),
            category: ErrorCategory::Captcha,
            ignored: false,
        })
        .await;

    assert_eq!(recorder.events().await.len(), 1);
}

#[test]
fn events_serialize_with_type_tag() {
    let json = Event::RetryScheduled {
        task_id: "t1".to_string(),
        action_id: "submit".to_string(),
        pass: 1,
        delay_ms: 500,
        category: ErrorCategory::SelectorNotFound,
    }
    .to_json();
    assert_eq!(json["type"], "action.retry_scheduled");
    assert_eq!(json["delay_ms"], 500);
    assert_eq!(json["category"], "selector_not_found");
}
