use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::store::{
    ExperienceRecord, MetricSnapshot, ModelRecord, ModelStore, NewExperience, NewMetricSnapshot,
    StoreError,
};

use super::experiences;
use super::metrics;
use super::models;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ModelStore for PostgresStore {
    async fn load_model(&self, domain: &str) -> Result<Option<ModelRecord>, StoreError> {
        models::load_model(&self.pool, domain).await
    }

    async fn save_model(&self, domain: &str, model: JsonValue) -> Result<ModelRecord, StoreError> {
        models::save_model(&self.pool, domain, model).await
    }

    async fn list_domains(&self) -> Result<Vec<String>, StoreError> {
        models::list_domains(&self.pool).await
    }

    async fn save_metric_snapshots(&self, snapshots: Vec<NewMetricSnapshot>) -> Result<u64, StoreError> {
        metrics::save_metric_snapshots(&self.pool, snapshots).await
    }

    async fn load_metric_snapshots(&self, website: Option<&str>) -> Result<Vec<MetricSnapshot>, StoreError> {
        metrics::load_metric_snapshots(&self.pool, website).await
    }

    async fn append_experience(&self, experience: NewExperience) -> Result<(), StoreError> {
        experiences::append_experience(&self.pool, experience).await
    }

    async fn list_experiences(&self, website: &str, limit: i64) -> Result<Vec<ExperienceRecord>, StoreError> {
        experiences::list_experiences(&self.pool, website, limit).await
    }
}
