use sqlx::PgPool;

use crate::store::{MetricSnapshot, NewMetricSnapshot, StoreError};

pub async fn save_metric_snapshots(
    pool: &PgPool,
    snapshots: Vec<NewMetricSnapshot>,
) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;
    for s in snapshots {
        let res = sqlx::query(
            r#"INSERT INTO selector_metrics (locator, website, task_type, metric) VALUES ($1, $2, $3, $4)"#,
        )
        .bind(s.locator)
        .bind(s.website)
        .bind(s.task_type)
        .bind(s.metric)
        .execute(&mut *tx)
        .await?;
        written += res.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}

pub async fn load_metric_snapshots(
    pool: &PgPool,
    website: Option<&str>,
) -> Result<Vec<MetricSnapshot>, StoreError> {
    let rows = sqlx::query_as::<_, MetricSnapshot>(
        r#"
SELECT DISTINCT ON (website, task_type, locator)
       id, locator, website, task_type, metric, captured_at
FROM selector_metrics
WHERE $1::text IS NULL OR website = $1
ORDER BY website, task_type, locator, captured_at DESC, id DESC
        "#,
    )
    .bind(website)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
