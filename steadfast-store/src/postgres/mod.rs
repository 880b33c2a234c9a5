mod experiences;
mod metrics;
mod migrate;
mod models;
mod store;

pub use migrate::run_migrations;
pub use store::PostgresStore;
