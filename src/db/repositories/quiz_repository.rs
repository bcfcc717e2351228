use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::{LessonQuiz, LessonQuizAttempt};

pub struct QuizRepository;

impl QuizRepository {
    /// Returns the lesson's quiz only when one exists and is marked
    /// required; optional quizzes never block completion.
    pub async fn required_quiz_for_lesson(
        pool: &PgPool,
        lesson_id: Uuid,
    ) -> Result<Option<LessonQuiz>, Error> {
        sqlx::query_as::<_, LessonQuiz>(
            r#"
            SELECT id, lesson_id, title, is_required, passing_score,
                   created_at, updated_at
            FROM lesson_quizzes
            WHERE lesson_id = $1 AND is_required = TRUE
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn latest_passing_attempt(
        pool: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LessonQuizAttempt>, Error> {
        sqlx::query_as::<_, LessonQuizAttempt>(
            r#"
            SELECT id, quiz_id, user_id, score, passed, completed_at
            FROM lesson_quiz_attempts
            WHERE quiz_id = $1 AND user_id = $2 AND passed = TRUE
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
