pub mod classify;
pub mod config;
pub mod learn;
pub mod metrics;
pub mod migrate;
pub mod rank;
pub mod run;
pub mod validate;
