use sqlx::PgPool;

use crate::store::StoreError;

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    let migrator = sqlx::migrate!("postgres/migrations");
    migrator
        .run(pool)
        .await
        .map_err(|e| StoreError::Other(e.to_string()))
}
