use chrono::{Duration, Utc};
use serde_json::json;
use steadfast_store::{InMemoryStore, ModelStore, NewExperience, NewMetricSnapshot};

#[tokio::test]
async fn model_versions_increase_on_save() {
    let store = InMemoryStore::new();
    assert!(store.load_model("shop.test").await.unwrap().is_none());

    let first = store.save_model("shop.test", json!({"a": 1})).await.unwrap();
    let second = store.save_model("shop.test", json!({"a": 2})).await.unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);

    let loaded = store.load_model("shop.test").await.unwrap().unwrap();
    assert_eq!(loaded.model, json!({"a": 2}));
    assert_eq!(store.list_domains().await.unwrap(), vec!["shop.test".to_string()]);
}

#[tokio::test]
async fn latest_metric_snapshot_wins_per_key() {
    let store = InMemoryStore::new();
    let snap = |website: &str, locator: &str, rate: f64| NewMetricSnapshot {
        locator: locator.to_string(),
        website: website.to_string(),
        task_type: "login".to_string(),
        metric: json!({ "successRate": rate }),
    };
    store
        .save_metric_snapshots(vec![snap("a.test", "#x", 0.1), snap("b.test", "#x", 0.5)])
        .await
        .unwrap();
    store.save_metric_snapshots(vec![snap("a.test", "#x", 0.9)]).await.unwrap();

    let all = store.load_metric_snapshots(None).await.unwrap();
    assert_eq!(all.len(), 2);
    let a = store.load_metric_snapshots(Some("a.test")).await.unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].metric, json!({ "successRate": 0.9 }));
}

#[tokio::test]
async fn experiences_are_append_only_and_newest_first() {
    let store = InMemoryStore::new();
    let now = Utc::now();
    for (i, offset) in [0i64, 5, 10].into_iter().enumerate() {
        store
            .append_experience(NewExperience {
                id: format!("e{i}"),
                website: "a.test".into(),
                task_type: "login".into(),
                payload: json!({ "n": i }),
                recorded_at: now + Duration::seconds(offset),
            })
            .await
            .unwrap();
    }
    // Same id again is ignored.
    store
        .append_experience(NewExperience {
            id: "e0".into(),
            website: "a.test".into(),
            task_type: "login".into(),
            payload: json!({ "n": 99 }),
            recorded_at: now,
        })
        .await
        .unwrap();

    let listed = store.list_experiences("a.test", 10).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e2", "e1", "e0"]);
    assert_eq!(listed[2].payload, json!({ "n": 0 }));
    assert_eq!(store.list_experiences("a.test", 1).await.unwrap().len(), 1);
}
