use sqlx::{Error, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::ProgressStatus;

use super::activity::{Activity, ActivityContext, CourseRef, LessonRef, UserRef};

/// Noise floor for the progress-update source: an update is worth surfacing
/// once it crosses the floor or the lesson is already completed.
pub fn is_significant(watch_percentage: f64, completed: bool, floor: f64) -> bool {
    watch_percentage >= floor || completed
}

#[derive(sqlx::FromRow)]
struct CompletionRow {
    user_id: Uuid,
    username: String,
    course_id: Uuid,
    course_name: String,
    lesson_id: Uuid,
    lesson_title: String,
    completed_at: OffsetDateTime,
    watch_percentage: f64,
}

/// Source 1: lesson completions, newest first.
pub async fn recent_completions(pool: &PgPool, limit: i64) -> Result<Vec<Activity>, Error> {
    let rows = sqlx::query_as::<_, CompletionRow>(
        r#"
        SELECT up.user_id, u.username, c.id AS course_id, c.name AS course_name,
               up.lesson_id, l.title AS lesson_title,
               up.completed_at, up.watch_percentage
        FROM user_progress up
        JOIN users u ON u.id = up.user_id
        JOIN lessons l ON l.id = up.lesson_id
        JOIN courses c ON c.id = l.course_id
        WHERE up.completed_at IS NOT NULL
        ORDER BY up.completed_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Activity::LessonCompleted {
            context: ActivityContext {
                timestamp: row.completed_at,
                user: UserRef {
                    id: row.user_id,
                    username: row.username,
                },
                course: CourseRef {
                    id: row.course_id,
                    name: row.course_name,
                },
                lesson: Some(LessonRef {
                    id: row.lesson_id,
                    title: row.lesson_title,
                }),
            },
            watch_percentage: row.watch_percentage,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ExamAttemptRow {
    user_id: Uuid,
    username: String,
    course_id: Uuid,
    course_name: String,
    started_at: OffsetDateTime,
    score: Option<f64>,
    passed: bool,
    attempt_number: i64,
}

/// Source 2: exam attempts, newest first. The attempt ordinal is the count
/// of this user's attempts on the exam started at or before this one,
/// computed in the same query.
pub async fn recent_exam_attempts(pool: &PgPool, limit: i64) -> Result<Vec<Activity>, Error> {
    let rows = sqlx::query_as::<_, ExamAttemptRow>(
        r#"
        SELECT ea.user_id, u.username, c.id AS course_id, c.name AS course_name,
               ea.started_at, ea.score, ea.passed,
               (SELECT COUNT(*) FROM exam_attempts prior
                WHERE prior.user_id = ea.user_id
                  AND prior.exam_id = ea.exam_id
                  AND prior.started_at <= ea.started_at) AS attempt_number
        FROM exam_attempts ea
        JOIN users u ON u.id = ea.user_id
        JOIN exams e ON e.id = ea.exam_id
        JOIN courses c ON c.id = e.course_id
        ORDER BY ea.started_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Activity::ExamAttempt {
            context: ActivityContext {
                timestamp: row.started_at,
                user: UserRef {
                    id: row.user_id,
                    username: row.username,
                },
                course: CourseRef {
                    id: row.course_id,
                    name: row.course_name,
                },
                lesson: None,
            },
            score: row.score,
            passed: row.passed,
            attempt_number: row.attempt_number,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct CertificationRow {
    user_id: Uuid,
    username: String,
    course_id: Uuid,
    course_name: String,
    issued_at: OffsetDateTime,
    certificate_id: Option<String>,
}

/// Source 3: issued certifications, newest first.
pub async fn recent_certifications(pool: &PgPool, limit: i64) -> Result<Vec<Activity>, Error> {
    let rows = sqlx::query_as::<_, CertificationRow>(
        r#"
        SELECT cert.user_id, u.username, c.id AS course_id, c.name AS course_name,
               cert.issued_at, cert.certificate_id
        FROM certifications cert
        JOIN users u ON u.id = cert.user_id
        JOIN courses c ON c.id = cert.course_id
        WHERE cert.issued_at IS NOT NULL
        ORDER BY cert.issued_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Activity::CertificationIssued {
            context: ActivityContext {
                timestamp: row.issued_at,
                user: UserRef {
                    id: row.user_id,
                    username: row.username,
                },
                course: CourseRef {
                    id: row.course_id,
                    name: row.course_name,
                },
                lesson: None,
            },
            certificate_id: row.certificate_id,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ProgressUpdateRow {
    user_id: Uuid,
    username: String,
    course_id: Uuid,
    course_name: String,
    lesson_id: Uuid,
    lesson_title: String,
    last_accessed_at: OffsetDateTime,
    watch_percentage: f64,
    completed: bool,
    status: ProgressStatus,
}

/// Source 4: recent watch progress, newest first, post-filtered to
/// significant updates. The filter runs after the LIMIT, so a burst of
/// low-percentage rows can under-fill this source; that lossiness is
/// intentional and the aggregator does not fetch more to compensate.
pub async fn recent_progress_updates(
    pool: &PgPool,
    limit: i64,
    significance_floor: f64,
) -> Result<Vec<Activity>, Error> {
    let rows = sqlx::query_as::<_, ProgressUpdateRow>(
        r#"
        SELECT up.user_id, u.username, c.id AS course_id, c.name AS course_name,
               up.lesson_id, l.title AS lesson_title,
               up.last_accessed_at, up.watch_percentage, up.completed,
               up.status
        FROM user_progress up
        JOIN users u ON u.id = up.user_id
        JOIN lessons l ON l.id = up.lesson_id
        JOIN courses c ON c.id = l.course_id
        WHERE up.watch_percentage > 0 AND up.last_accessed_at IS NOT NULL
        ORDER BY up.last_accessed_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|row| is_significant(row.watch_percentage, row.completed, significance_floor))
        .map(|row| Activity::ProgressUpdate {
            context: ActivityContext {
                timestamp: row.last_accessed_at,
                user: UserRef {
                    id: row.user_id,
                    username: row.username,
                },
                course: CourseRef {
                    id: row.course_id,
                    name: row.course_name,
                },
                lesson: Some(LessonRef {
                    id: row.lesson_id,
                    title: row.lesson_title,
                }),
            },
            watch_percentage: row.watch_percentage,
            status: row.status,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significance_floor_is_inclusive() {
        assert!(!is_significant(40.0, false, 50.0));
        assert!(!is_significant(49.9, false, 50.0));
        assert!(is_significant(50.0, false, 50.0));
        assert!(is_significant(80.0, false, 50.0));
    }

    #[test]
    fn completed_records_are_significant_regardless_of_percentage() {
        assert!(is_significant(10.0, true, 50.0));
        assert!(is_significant(0.5, true, 50.0));
    }
}
