use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Optional quiz attached to a lesson. When `is_required` is set the quiz
/// must be passed before the lesson can be completed manually.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LessonQuiz {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub is_required: bool,
    pub passing_score: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LessonQuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: Option<f64>,
    pub passed: bool,
    pub completed_at: OffsetDateTime,
}
