use sqlx::{Error, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::models::UserProgress;

pub struct ProgressRepository;

impl ProgressRepository {
    /// Get-or-creates the (user, lesson) record and takes a row lock on it.
    /// The insert races safely against concurrent first-access: the unique
    /// constraint plus ON CONFLICT DO NOTHING guarantees a single record,
    /// and the locked SELECT always observes it.
    pub async fn get_or_create_for_update(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        lesson_id: Uuid,
        completion_threshold: f64,
    ) -> Result<UserProgress, Error> {
        sqlx::query(
            r#"
            INSERT INTO user_progress (user_id, lesson_id, completion_threshold)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, lesson_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(completion_threshold)
        .execute(&mut **tx)
        .await?;

        sqlx::query_as::<_, UserProgress>(
            r#"
            SELECT id, user_id, lesson_id, status, completed, completed_at,
                   progress_percent, watch_percentage, last_position_secs,
                   completion_threshold, started_at, last_accessed_at,
                   created_at, updated_at
            FROM user_progress
            WHERE user_id = $1 AND lesson_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Persists the mutable fields of an already-loaded record.
    pub async fn save(
        tx: &mut Transaction<'_, Postgres>,
        record: &UserProgress,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE user_progress
            SET status = $1,
                completed = $2,
                completed_at = $3,
                progress_percent = $4,
                watch_percentage = $5,
                last_position_secs = $6,
                started_at = $7,
                last_accessed_at = $8,
                updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(record.status)
        .bind(record.completed)
        .bind(record.completed_at)
        .bind(record.progress_percent)
        .bind(record.watch_percentage)
        .bind(record.last_position_secs)
        .bind(record.started_at)
        .bind(record.last_accessed_at)
        .bind(record.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    #[allow(unused)]
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<UserProgress>, Error> {
        sqlx::query_as::<_, UserProgress>(
            r#"
            SELECT id, user_id, lesson_id, status, completed, completed_at,
                   progress_percent, watch_percentage, last_position_secs,
                   completion_threshold, started_at, last_accessed_at,
                   created_at, updated_at
            FROM user_progress
            WHERE user_id = $1 AND lesson_id = $2
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }
}
