mod config;
mod defaults;
mod engine;
mod model;
mod shape;

pub use config::LearningConfig;
pub use engine::{LearningContext, LearningEngine, LoadOutcome};
pub use model::{
    LearningModel, Pattern, StrategySuggestion, Suggestion, SuggestionSource, WeightedRate,
};
pub use shape::shape_of;
