#![forbid(unsafe_code)]

pub mod memory;
pub mod postgres;
pub mod store;

pub use crate::memory::InMemoryStore;
pub use crate::postgres::run_migrations;
pub use crate::postgres::PostgresStore;
pub use crate::store::{
    ExperienceRecord, MetricSnapshot, ModelRecord, ModelStore, NewExperience, NewMetricSnapshot,
    StoreError,
};
