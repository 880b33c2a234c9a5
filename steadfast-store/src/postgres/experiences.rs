use sqlx::PgPool;

use crate::store::{ExperienceRecord, NewExperience, StoreError};

pub async fn append_experience(pool: &PgPool, e: NewExperience) -> Result<(), StoreError> {
    sqlx::query(
        r#"
INSERT INTO experiences (id, website, task_type, payload, recorded_at)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(e.id)
    .bind(e.website)
    .bind(e.task_type)
    .bind(e.payload)
    .bind(e.recorded_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_experiences(
    pool: &PgPool,
    website: &str,
    limit: i64,
) -> Result<Vec<ExperienceRecord>, StoreError> {
    let rows = sqlx::query_as::<_, ExperienceRecord>(
        r#"
SELECT id, website, task_type, payload, recorded_at
FROM experiences WHERE website = $1 ORDER BY recorded_at DESC LIMIT $2
        "#,
    )
    .bind(website)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
