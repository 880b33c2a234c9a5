use std::sync::Arc;

use steadfast_core::{ErrorClassifier, FailureClassifier, SelectorScorer};
use steadfast_store::ModelStore;

use crate::executor::events::EventBus;
use crate::learning::{LearningConfig, LearningEngine};
use crate::tracker::{PerformanceTracker, TrackerConfig};

/// Shared collaborators, built once and handed to every engine. Only the
/// tracker and the learning engine hold mutable shared state.
#[derive(Clone)]
pub struct Services {
    pub tracker: Arc<PerformanceTracker>,
    pub learning: Arc<LearningEngine>,
    pub classifier: Arc<dyn FailureClassifier>,
    pub scorer: SelectorScorer,
    pub events: Arc<EventBus>,
    pub store: Option<Arc<dyn ModelStore>>,
}

impl Default for Services {
    fn default() -> Self {
        Self::new(TrackerConfig::default(), LearningConfig::default())
    }
}

impl Services {
    pub fn new(tracker: TrackerConfig, learning: LearningConfig) -> Self {
        Self {
            tracker: Arc::new(PerformanceTracker::new(tracker)),
            learning: Arc::new(LearningEngine::new(learning)),
            classifier: Arc::new(ErrorClassifier),
            scorer: SelectorScorer::default(),
            events: Arc::new(EventBus::new()),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_scorer(mut self, scorer: SelectorScorer) -> Self {
        self.scorer = scorer;
        self
    }
}
