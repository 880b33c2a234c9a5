use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::store::{ModelRecord, StoreError};

pub async fn load_model(pool: &PgPool, domain: &str) -> Result<Option<ModelRecord>, StoreError> {
    let rec = sqlx::query_as::<_, ModelRecord>(
        r#"SELECT domain, model, version, updated_at FROM learning_models WHERE domain = $1"#,
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;
    Ok(rec)
}

pub async fn save_model(pool: &PgPool, domain: &str, model: JsonValue) -> Result<ModelRecord, StoreError> {
    let rec = sqlx::query_as::<_, ModelRecord>(
        r#"
INSERT INTO learning_models (domain, model)
VALUES ($1, $2)
ON CONFLICT (domain) DO UPDATE
SET model = EXCLUDED.model,
    version = learning_models.version + 1,
    updated_at = now()
RETURNING domain, model, version, updated_at
        "#,
    )
    .bind(domain)
    .bind(model)
    .fetch_one(pool)
    .await?;
    Ok(rec)
}

pub async fn list_domains(pool: &PgPool) -> Result<Vec<String>, StoreError> {
    let rows: Vec<(String,)> =
        sqlx::query_as(r#"SELECT domain FROM learning_models ORDER BY domain"#)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}
