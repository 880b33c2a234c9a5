use std::collections::HashMap;
use std::sync::Arc;

use steadfast_core::{Experience, KindBias, LocatorKind, Strategy};
use steadfast_store::{ModelStore, StoreError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::config::LearningConfig;
use super::defaults::{cold_candidate, cold_strategy};
use super::model::{LearningModel, Pattern, StrategySuggestion, Suggestion, SuggestionSource};

/// What the caller knows about the element being looked for.
#[derive(Debug, Clone, Default)]
pub struct LearningContext {
    /// Free-text description (action id, field name, label).
    pub hint: Option<String>,
    /// Restricts learned suggestions to locators observed for this action.
    pub action: Option<String>,
    /// Locators already tried; never suggested again.
    pub exclude: Vec<String>,
}

impl LearningContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn for_action(mut self, action_id: impl Into<String>) -> Self {
        self.action = Some(action_id.into());
        self
    }

    pub fn excluding(mut self, locators: impl IntoIterator<Item = String>) -> Self {
        self.exclude.extend(locators);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { version: i64 },
    /// No stored model; starting cold.
    Missing,
    /// Stored blob did not deserialize; starting cold.
    Corrupt { reason: String },
    /// Store failed; starting cold.
    Unavailable { reason: String },
}

impl LoadOutcome {
    pub fn is_cold(&self) -> bool {
        !matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Per-website models of which locators and strategies work.
///
/// Shared between task instances the same way as the performance tracker: a
/// map-level read/write lock over per-domain mutexes.
pub struct LearningEngine {
    cfg: LearningConfig,
    models: RwLock<HashMap<String, Arc<Mutex<LearningModel>>>>,
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new(LearningConfig::default())
    }
}

impl LearningEngine {
    pub fn new(cfg: LearningConfig) -> Self {
        Self {
            cfg,
            models: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.cfg
    }

    async fn model_for(&self, domain: &str) -> Arc<Mutex<LearningModel>> {
        if let Some(m) = self.models.read().await.get(domain) {
            return m.clone();
        }
        self.models
            .write()
            .await
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(LearningModel::new(domain))))
            .clone()
    }

    async fn existing(&self, domain: &str) -> Option<Arc<Mutex<LearningModel>>> {
        self.models.read().await.get(domain).cloned()
    }

    pub async fn observe(&self, exp: &Experience) {
        let model = self.model_for(&exp.website).await;
        model.lock().await.observe(exp, &self.cfg);
    }

    /// Best learned locator for the task type on this site, or the cold-start
    /// table entry when nothing qualifies. With an action in the context only
    /// locators observed for that action are considered. Never fails.
    pub async fn best_candidate(&self, task_type: &str, website: &str, ctx: &LearningContext) -> Suggestion {
        if let Some(model) = self.existing(website).await {
            let model = model.lock().await;
            let stats = match ctx.action.as_deref() {
                Some(action_id) => model.element(task_type, action_id),
                None => model.locators.get(task_type),
            };
            let learned = stats
                .into_iter()
                .flatten()
                .filter(|(locator, r)| {
                    r.observations >= self.cfg.min_observations
                        && LocatorKind::infer(locator) != LocatorKind::Page
                        && !ctx.exclude.iter().any(|e| e == *locator)
                })
                .map(|(locator, r)| (locator, r.confidence(self.cfg.min_observations)))
                .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)));
            if let Some((locator, confidence)) = learned {
                return Suggestion {
                    locator: locator.clone(),
                    kind: LocatorKind::infer(locator),
                    confidence,
                    source: SuggestionSource::Learned,
                };
            }
        }
        cold_candidate(ctx.hint.as_deref(), task_type, &ctx.exclude)
    }

    pub async fn best_strategy(&self, task_type: &str, website: &str) -> StrategySuggestion {
        if let Some(model) = self.existing(website).await {
            let model = model.lock().await;
            let learned = model
                .strategies
                .get(task_type)
                .into_iter()
                .flatten()
                .filter(|(_, r)| r.observations >= self.cfg.min_observations)
                .filter_map(|(id, r)| {
                    let strategy = id.parse::<Strategy>().ok()?;
                    Some((strategy, r.confidence(self.cfg.min_observations)))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((strategy, confidence)) = learned {
                return StrategySuggestion {
                    strategy,
                    confidence,
                    source: SuggestionSource::Learned,
                };
            }
        }
        cold_strategy()
    }

    /// The strategy with the fewest observations for the task type, when it is
    /// still short of `min_observations`. `None` for a task type with no
    /// strategy history, or once every strategy has been sampled enough.
    pub async fn under_sampled_strategy(&self, task_type: &str, website: &str) -> Option<Strategy> {
        let model = self.existing(website).await?;
        let model = model.lock().await;
        let stats = model.strategies.get(task_type).filter(|s| !s.is_empty())?;
        Strategy::ALL
            .into_iter()
            .map(|s| (s, stats.get(s.as_str()).map_or(0, |r| r.observations)))
            .filter(|(_, n)| *n < self.cfg.min_observations)
            .min_by_key(|(_, n)| *n)
            .map(|(s, _)| s)
    }

    /// Learned per-kind success rates for the scorer.
    pub async fn kind_bias(&self, website: &str) -> KindBias {
        let mut bias = KindBias::default();
        let Some(model) = self.existing(website).await else {
            return bias;
        };
        let model = model.lock().await;
        for (id, rate) in &model.kinds {
            if rate.observations < self.cfg.min_observations {
                continue;
            }
            if let Some(kind) = LocatorKind::ALL.into_iter().find(|k| k.as_str() == id) {
                bias.set(kind, rate.rate());
            }
        }
        bias
    }

    pub async fn model(&self, domain: &str) -> Option<LearningModel> {
        let model = self.existing(domain).await?;
        let snapshot = model.lock().await.clone();
        Some(snapshot)
    }

    /// Every pattern revision for the site, superseded ones included.
    pub async fn patterns(&self, domain: &str) -> Vec<Pattern> {
        match self.existing(domain).await {
            Some(m) => m.lock().await.patterns.clone(),
            None => Vec::new(),
        }
    }

    pub async fn domains(&self) -> Vec<String> {
        let mut out: Vec<String> = self.models.read().await.keys().cloned().collect();
        out.sort();
        out
    }

    /// Replaces the in-memory model for `domain` with the stored one. Anything
    /// short of a clean load leaves an empty model in place.
    pub async fn load(&self, domain: &str, store: &dyn ModelStore) -> LoadOutcome {
        let (model, outcome) = match store.load_model(domain).await {
            Ok(Some(record)) => match serde_json::from_value::<LearningModel>(record.model) {
                Ok(mut m) => {
                    m.domain = domain.to_string();
                    info!(domain, version = record.version, "learning model loaded");
                    (m, LoadOutcome::Loaded { version: record.version })
                }
                Err(e) => {
                    warn!(domain, error = %e, "stored learning model is corrupt; starting cold");
                    (LearningModel::new(domain), LoadOutcome::Corrupt { reason: e.to_string() })
                }
            },
            Ok(None) => {
                debug!(domain, "no stored learning model; starting cold");
                (LearningModel::new(domain), LoadOutcome::Missing)
            }
            Err(e) => {
                warn!(domain, error = %e, "learning model store unavailable; starting cold");
                (LearningModel::new(domain), LoadOutcome::Unavailable { reason: e.to_string() })
            }
        };
        self.models
            .write()
            .await
            .insert(domain.to_string(), Arc::new(Mutex::new(model)));
        outcome
    }

    /// Loads `domain` unless a model for it is already in memory.
    pub async fn ensure_loaded(&self, domain: &str, store: &dyn ModelStore) -> Option<LoadOutcome> {
        if self.existing(domain).await.is_some() {
            return None;
        }
        Some(self.load(domain, store).await)
    }

    /// Persists the model for `domain`; returns the stored version, or `None`
    /// when nothing is known about the domain.
    pub async fn save(&self, domain: &str, store: &dyn ModelStore) -> Result<Option<i64>, StoreError> {
        let Some(model) = self.model(domain).await else {
            return Ok(None);
        };
        let blob = serde_json::to_value(&model).map_err(|e| StoreError::Other(e.to_string()))?;
        let record = store.save_model(domain, blob).await?;
        info!(domain, version = record.version, "learning model saved");
        Ok(Some(record.version))
    }
}
