mod trait_store;
mod types;

pub use trait_store::{ModelStore, StoreError};
pub use types::{ExperienceRecord, MetricSnapshot, ModelRecord, NewExperience, NewMetricSnapshot};
