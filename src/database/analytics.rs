use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Record one view and bump the denormalized counter in the same transaction
pub async fn record_view(
    pool: &PgPool,
    question_id: Uuid,
    viewer_ip: Option<&str>,
    viewer_user_id: Option<Uuid>,
) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO question_views (question_id, viewer_ip, viewer_user_id) VALUES ($1, $2, $3)")
        .bind(question_id)
        .bind(viewer_ip)
        .bind(viewer_user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE questions SET view_count = view_count + 1 WHERE id = $1")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// View timestamps for a question since `since`, oldest first
pub async fn view_times_since(
    pool: &PgPool,
    question_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, DatabaseError> {
    let rows: Vec<(DateTime<Utc>,)> = sqlx::query_as(
        "SELECT viewed_at FROM question_views WHERE question_id = $1 AND viewed_at >= $2 ORDER BY viewed_at ASC",
    )
    .bind(question_id)
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(viewed_at,)| viewed_at).collect())
}
