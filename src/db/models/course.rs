use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[allow(unused)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[allow(unused)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub slug: String,
    pub lesson_order: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Lesson joined with its course slugs, enough to build user-facing URLs
/// without a second round-trip.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LessonWithCourse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub slug: String,
    pub course_slug: String,
}

impl LessonWithCourse {
    pub fn quiz_url(&self) -> String {
        format!("/courses/{}/lessons/{}/quiz/", self.course_slug, self.slug)
    }
}
