use sqlx::PgPool;
use tracing::warn;

use super::activity::Activity;
use super::sources;

/// Merges per-source candidate lists into one feed: sources are
/// concatenated in declaration order, stably sorted by timestamp
/// descending (so declaration order breaks ties) and truncated to `limit`.
pub fn merge_and_sort(source_outputs: Vec<Vec<Activity>>, limit: usize) -> Vec<Activity> {
    let mut activities: Vec<Activity> = source_outputs.into_iter().flatten().collect();
    activities.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    activities.truncate(limit);
    activities
}

fn source_or_empty(name: &str, result: Result<Vec<Activity>, sqlx::Error>) -> Vec<Activity> {
    match result {
        Ok(activities) => activities,
        Err(err) => {
            warn!(source = name, error = %err, "activity source failed; omitting from feed");
            Vec::new()
        }
    }
}

/// Builds the aggregated activity feed. Each source is independently capped
/// to `limit` before the merge so one noisy source cannot starve the
/// others; the candidate pool is therefore up to four times `limit` rows.
/// A read-only, idempotent function of current store state.
///
/// A single failing source degrades the feed rather than failing it: its
/// entries are omitted and the remaining sources still merge.
pub async fn get_activity_feed(
    pool: &PgPool,
    limit: i64,
    significance_floor: f64,
) -> Vec<Activity> {
    let (completions, exam_attempts, certifications, progress_updates) = tokio::join!(
        sources::recent_completions(pool, limit),
        sources::recent_exam_attempts(pool, limit),
        sources::recent_certifications(pool, limit),
        sources::recent_progress_updates(pool, limit, significance_floor),
    );

    merge_and_sort(
        vec![
            source_or_empty("completions", completions),
            source_or_empty("exam_attempts", exam_attempts),
            source_or_empty("certifications", certifications),
            source_or_empty("progress_updates", progress_updates),
        ],
        limit.max(0) as usize,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressStatus;
    use crate::modules::feed::activity::{ActivityContext, CourseRef, LessonRef, UserRef};
    use time::macros::datetime;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn context(timestamp: OffsetDateTime) -> ActivityContext {
        ActivityContext {
            timestamp,
            user: UserRef {
                id: Uuid::nil(),
                username: "casey".to_string(),
            },
            course: CourseRef {
                id: Uuid::nil(),
                name: "Songwriting 101".to_string(),
            },
            lesson: Some(LessonRef {
                id: Uuid::nil(),
                title: "Verse structure".to_string(),
            }),
        }
    }

    fn completion(timestamp: OffsetDateTime) -> Activity {
        Activity::LessonCompleted {
            context: context(timestamp),
            watch_percentage: 95.0,
        }
    }

    fn exam_attempt(timestamp: OffsetDateTime) -> Activity {
        Activity::ExamAttempt {
            context: context(timestamp),
            score: Some(82.0),
            passed: true,
            attempt_number: 1,
        }
    }

    fn certification(timestamp: OffsetDateTime) -> Activity {
        Activity::CertificationIssued {
            context: context(timestamp),
            certificate_id: Some("cert-123".to_string()),
        }
    }

    fn progress_update(timestamp: OffsetDateTime, watch_percentage: f64) -> Activity {
        Activity::ProgressUpdate {
            context: context(timestamp),
            watch_percentage,
            status: ProgressStatus::InProgress,
        }
    }

    #[test]
    fn sorts_newest_first_and_truncates() {
        let t = |minute| datetime!(2026-03-01 12:00 UTC) + time::Duration::minutes(minute);
        let merged = merge_and_sort(
            vec![
                vec![completion(t(3)), completion(t(1))],
                vec![exam_attempt(t(4)), exam_attempt(t(0))],
                vec![certification(t(2))],
            ],
            3,
        );

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].timestamp(), t(4));
        assert_eq!(merged[1].timestamp(), t(3));
        assert_eq!(merged[2].timestamp(), t(2));
    }

    #[test]
    fn returns_at_most_limit_entries() {
        let t = datetime!(2026-03-01 12:00 UTC);
        let many: Vec<Activity> = (0..30)
            .map(|minute| completion(t + time::Duration::minutes(minute)))
            .collect();
        let merged = merge_and_sort(vec![many], 20);
        assert_eq!(merged.len(), 20);
    }

    #[test]
    fn equal_timestamps_keep_source_declaration_order() {
        let t = datetime!(2026-03-01 12:00 UTC);
        let merged = merge_and_sort(
            vec![
                vec![completion(t)],
                vec![exam_attempt(t)],
                vec![certification(t)],
                vec![progress_update(t, 60.0)],
            ],
            10,
        );

        assert!(matches!(merged[0], Activity::LessonCompleted { .. }));
        assert!(matches!(merged[1], Activity::ExamAttempt { .. }));
        assert!(matches!(merged[2], Activity::CertificationIssued { .. }));
        assert!(matches!(merged[3], Activity::ProgressUpdate { .. }));
    }

    #[test]
    fn under_filled_sources_yield_a_short_feed() {
        // 3 completions + 2 exam attempts + 1 certification + 2 significant
        // progress updates (3 more were filtered out at the source). Rows
        // dropped by the noise filter never reach the merge, so with limit
        // 10 the feed holds exactly the 8 that arrived.
        let t = |minute| datetime!(2026-03-01 12:00 UTC) + time::Duration::minutes(minute);
        let merged = merge_and_sort(
            vec![
                vec![completion(t(0)), completion(t(1)), completion(t(2))],
                vec![exam_attempt(t(3)), exam_attempt(t(4))],
                vec![certification(t(5))],
                vec![progress_update(t(6), 55.0), progress_update(t(7), 72.0)],
            ],
            10,
        );
        assert_eq!(merged.len(), 8);
        // Non-increasing timestamps throughout.
        for pair in merged.windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
    }

    #[test]
    fn empty_sources_produce_an_empty_feed() {
        let merged = merge_and_sort(vec![vec![], vec![], vec![], vec![]], 20);
        assert!(merged.is_empty());
    }
}
