use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use steadfast_core::{Experience, LocatorKind, Strategy};
use steadfast_exec::learning::{LoadOutcome, SuggestionSource};
use steadfast_exec::{LearningConfig, LearningContext, LearningEngine};
use steadfast_store::{
    ExperienceRecord, InMemoryStore, MetricSnapshot, ModelRecord, ModelStore, NewExperience,
    NewMetricSnapshot, StoreError,
};

fn exp(website: &str, task_type: &str, locator: &str, success: bool, strategy: Strategy) -> Experience {
    Experience {
        id: uuid::Uuid::new_v4().to_string(),
        locator: locator.to_string(),
        locator_kind: LocatorKind::infer(locator),
        success,
        website: website.to_string(),
        task_type: task_type.to_string(),
        action_id: Some("submit".to_string()),
        url: Some(format!("https://{website}/")),
        strategy: Some(strategy),
        recorded_at: Utc::now(),
    }
}

async fn teach(engine: &LearningEngine, locator: &str, times: usize, success: bool) {
    for _ in 0..times {
        engine
            .observe(&exp("shop.test", "login", locator, success, Strategy::Direct))
            .await;
    }
}

#[tokio::test]
async fn unknown_site_gets_a_low_confidence_cold_start() {
    let engine = LearningEngine::default();
    let s = engine
        .best_candidate("login", "newsite.test", &LearningContext::new())
        .await;
    assert_eq!(s.source, SuggestionSource::ColdStart);
    assert!(s.confidence <= 0.4);
    assert!(!s.locator.is_empty());
}

#[tokio::test]
async fn cold_start_follows_the_hint() {
    let engine = LearningEngine::default();
    let ctx = LearningContext::new().with_hint("password");
    let s = engine.best_candidate("login", "newsite.test", &ctx).await;
    assert_eq!(s.source, SuggestionSource::ColdStart);
    assert!(s.locator.contains("password"));
}

#[tokio::test]
async fn repeated_success_becomes_the_learned_choice() {
    let engine = LearningEngine::default();
    teach(&engine, "#signin", 6, true).await;
    teach(&engine, "#login", 6, false).await;

    let s = engine
        .best_candidate("login", "shop.test", &LearningContext::new())
        .await;
    assert_eq!(s.source, SuggestionSource::Learned);
    assert_eq!(s.locator, "#signin");
    assert!((s.confidence - 1.0).abs() < 1e-9);

    let excluded = engine
        .best_candidate(
            "login",
            "shop.test",
            &LearningContext::new().excluding(["#signin".to_string()]),
        )
        .await;
    assert_ne!(excluded.locator, "#signin");
}

#[tokio::test]
async fn action_scoped_lookup_only_sees_that_actions_locators() {
    let engine = LearningEngine::default();
    teach(&engine, "#signin", 6, true).await;
    for _ in 0..6 {
        let mut e = exp("shop.test", "login", "#password", true, Strategy::Direct);
        e.action_id = Some("password".to_string());
        engine.observe(&e).await;
    }

    let submit = engine
        .best_candidate("login", "shop.test", &LearningContext::new().for_action("submit"))
        .await;
    assert_eq!(submit.source, SuggestionSource::Learned);
    assert_eq!(submit.locator, "#signin");

    let password = engine
        .best_candidate("login", "shop.test", &LearningContext::new().for_action("password"))
        .await;
    assert_eq!(password.locator, "#password");

    let email = engine
        .best_candidate(
            "login",
            "shop.test",
            &LearningContext::new().with_hint("email").for_action("email"),
        )
        .await;
    assert_eq!(email.source, SuggestionSource::ColdStart);
    assert!(email.confidence <= 0.4);
}

#[tokio::test]
async fn too_few_observations_are_not_trusted() {
    let engine = LearningEngine::default();
    teach(&engine, "#signin", 2, true).await;
    let s = engine
        .best_candidate("login", "shop.test", &LearningContext::new())
        .await;
    assert_eq!(s.source, SuggestionSource::ColdStart);
}

#[tokio::test]
async fn best_strategy_prefers_the_one_that_works() {
    let engine = LearningEngine::default();
    assert_eq!(engine.best_strategy("login", "shop.test").await.strategy, Strategy::Direct);

    for _ in 0..6 {
        engine
            .observe(&exp("shop.test", "login", "#signin", true, Strategy::WaitThenAct))
            .await;
        engine
            .observe(&exp("shop.test", "login", "#signin", false, Strategy::Direct))
            .await;
    }
    let s = engine.best_strategy("login", "shop.test").await;
    assert_eq!(s.strategy, Strategy::WaitThenAct);
    assert_eq!(s.source, SuggestionSource::Learned);
}

#[tokio::test]
async fn kind_bias_reflects_observed_kinds() {
    let engine = LearningEngine::default();
    teach(&engine, "#signin", 4, true).await;
    teach(&engine, "text=Sign in", 4, false).await;

    let bias = engine.kind_bias("shop.test").await;
    assert_eq!(bias.get(LocatorKind::Attribute), Some(1.0));
    assert_eq!(bias.get(LocatorKind::Text), Some(0.0));
    assert_eq!(bias.get(LocatorKind::Path), None);
}

#[tokio::test]
async fn model_survives_a_save_and_load() {
    let store = InMemoryStore::new();
    let first = LearningEngine::default();
    teach(&first, "#signin", 6, true).await;
    assert_eq!(first.save("shop.test", &store).await.unwrap(), Some(1));
    assert_eq!(first.save("other.test", &store).await.unwrap(), None);

    let second = LearningEngine::default();
    assert_eq!(
        second.load("shop.test", &store).await,
        LoadOutcome::Loaded { version: 1 }
    );
    assert_eq!(
        second.model("shop.test").await,
        first.model("shop.test").await
    );
    let s = second
        .best_candidate("login", "shop.test", &LearningContext::new())
        .await;
    assert_eq!(s.locator, "#signin");
    assert_eq!(s.source, SuggestionSource::Learned);
}

#[tokio::test]
async fn corrupt_model_falls_back_to_cold_start() {
    let store = InMemoryStore::new();
    store.put_raw_model("shop.test", json!({ "locators": 5 })).await;

    let engine = LearningEngine::default();
    let outcome = engine.load("shop.test", &store).await;
    assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
    assert!(outcome.is_cold());

    let s = engine
        .best_candidate("login", "shop.test", &LearningContext::new())
        .await;
    assert_eq!(s.source, SuggestionSource::ColdStart);
    // A cold model is in place, so a second ensure_loaded does not hit the store.
    assert!(engine.ensure_loaded("shop.test", &store).await.is_none());
}

#[tokio::test]
async fn missing_model_is_cold() {
    let engine = LearningEngine::default();
    let outcome = engine.load("shop.test", &InMemoryStore::new()).await;
    assert_eq!(outcome, LoadOutcome::Missing);
}

struct DownStore;

#[async_trait]
impl ModelStore for DownStore {
    async fn load_model(&self, _domain: &str) -> Result<Option<ModelRecord>, StoreError> {
        Err(StoreError::Other("connection refused".to_string()))
    }

    async fn save_model(&self, _domain: &str, _model: JsonValue) -> Result<ModelRecord, StoreError> {
        Err(StoreError::Other("connection refused".to_string()))
    }

    async fn list_domains(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_metric_snapshots(&self, _snapshots: Vec<NewMetricSnapshot>) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn load_metric_snapshots(&self, _website: Option<&str>) -> Result<Vec<MetricSnapshot>, StoreError> {
        Ok(Vec::new())
    }

    async fn append_experience(&self, _experience: NewExperience) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_experiences(&self, _website: &str, _limit: i64) -> Result<Vec<ExperienceRecord>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn unavailable_store_is_survivable() {
    let engine = LearningEngine::default();
    let outcome = engine.load("shop.test", &DownStore).await;
    assert!(matches!(outcome, LoadOutcome::Unavailable { .. }));

    teach(&engine, "#signin", 1, true).await;
    assert!(engine.save("shop.test", &DownStore).await.is_err());
}

#[tokio::test]
async fn contradicting_evidence_supersedes_a_pattern() {
    let engine = LearningEngine::new(LearningConfig::default());
    teach(&engine, "#signin", 3, true).await;
    teach(&engine, "#login", 6, false).await;

    let patterns = engine.patterns("shop.test").await;
    assert!(patterns.iter().any(|p| p.superseded && p.revision == 1));
    assert_eq!(patterns.iter().filter(|p| !p.superseded).count(), 1);
    assert_eq!(engine.domains().await, vec!["shop.test".to_string()]);
}
