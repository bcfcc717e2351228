use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::LessonWithCourse;

pub struct LessonRepository;

impl LessonRepository {
    /// Fetches a lesson together with its course slug in one query, so
    /// callers can build quiz URLs without a second lookup.
    pub async fn find_with_course(
        pool: &PgPool,
        lesson_id: Uuid,
    ) -> Result<Option<LessonWithCourse>, Error> {
        sqlx::query_as::<_, LessonWithCourse>(
            r#"
            SELECT l.id, l.course_id, l.title, l.slug, c.slug AS course_slug
            FROM lessons l
            JOIN courses c ON c.id = l.course_id
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }
}
