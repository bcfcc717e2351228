use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Final exam for a course, one per course.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[allow(unused)]
pub struct Exam {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub passing_score: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[allow(unused)]
pub struct ExamAttempt {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub user_id: Uuid,
    pub score: Option<f64>,
    pub passed: bool,
    pub started_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}
