use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::ProgressStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonRef {
    pub id: Uuid,
    pub title: String,
}

/// Fields shared by every activity kind. Display names are resolved at
/// query time so the feed renders without per-row lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityContext {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user: UserRef,
    pub course: CourseRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<LessonRef>,
}

/// One normalized entry in the student activity feed. Ephemeral: derived
/// from the stores on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    LessonCompleted {
        #[serde(flatten)]
        context: ActivityContext,
        watch_percentage: f64,
    },
    ExamAttempt {
        #[serde(flatten)]
        context: ActivityContext,
        score: Option<f64>,
        passed: bool,
        attempt_number: i64,
    },
    CertificationIssued {
        #[serde(flatten)]
        context: ActivityContext,
        certificate_id: Option<String>,
    },
    ProgressUpdate {
        #[serde(flatten)]
        context: ActivityContext,
        watch_percentage: f64,
        status: ProgressStatus,
    },
}

impl Activity {
    pub fn timestamp(&self) -> OffsetDateTime {
        match self {
            Activity::LessonCompleted { context, .. }
            | Activity::ExamAttempt { context, .. }
            | Activity::CertificationIssued { context, .. }
            | Activity::ProgressUpdate { context, .. } => context.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serializes_with_snake_case_type_tag() {
        let activity = Activity::LessonCompleted {
            context: ActivityContext {
                timestamp: datetime!(2026-03-01 12:00 UTC),
                user: UserRef {
                    id: Uuid::nil(),
                    username: "casey".to_string(),
                },
                course: CourseRef {
                    id: Uuid::nil(),
                    name: "Songwriting 101".to_string(),
                },
                lesson: None,
            },
            watch_percentage: 93.5,
        };

        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], "lesson_completed");
        assert_eq!(value["watch_percentage"], 93.5);
        assert_eq!(value["user"]["username"], "casey");
        assert!(value.get("lesson").is_none());
    }
}
