use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "progress_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// One watch-progress sample as reported by the playback client.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSample {
    pub watch_percentage: f64,
    pub position_secs: f64,
}

/// Per-(user, lesson) progress record. `status`, `completed`, `started_at`
/// and `completed_at` are derived by `apply_sample`/`force_complete` and are
/// never set directly by callers.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UserProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub status: ProgressStatus,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub progress_percent: i32,
    pub watch_percentage: f64,
    pub last_position_secs: f64,
    pub completion_threshold: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_accessed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Three-branch status projection shared by the sample path and the
/// completion gate.
pub fn derive_status(watch_percentage: f64, threshold: f64) -> ProgressStatus {
    if watch_percentage >= threshold {
        ProgressStatus::Completed
    } else if watch_percentage > 0.0 {
        ProgressStatus::InProgress
    } else {
        ProgressStatus::NotStarted
    }
}

fn clamp_percentage(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

impl UserProgress {
    /// Applies one watch sample: last write wins on `watch_percentage` and
    /// `last_position_secs` (no sequence guard against out-of-order
    /// delivery), then re-derives status. Completion is sticky: once
    /// `completed_at` is set the record stays Completed even when a stale
    /// lower sample lands afterwards.
    pub fn apply_sample(&mut self, sample: ProgressSample, now: OffsetDateTime) {
        let watch_percentage = clamp_percentage(sample.watch_percentage);
        if watch_percentage != sample.watch_percentage {
            tracing::debug!(
                reported = sample.watch_percentage,
                clamped = watch_percentage,
                "out-of-range watch percentage clamped"
            );
        }

        self.watch_percentage = watch_percentage;
        self.last_position_secs = sample.position_secs;
        self.progress_percent = watch_percentage.floor() as i32;
        self.last_accessed_at = now;

        if self.completed_at.is_some() {
            self.status = ProgressStatus::Completed;
            self.completed = true;
            return;
        }

        match derive_status(watch_percentage, self.completion_threshold) {
            ProgressStatus::Completed => {
                self.status = ProgressStatus::Completed;
                self.completed = true;
                self.completed_at = Some(now);
            }
            ProgressStatus::InProgress => {
                self.status = ProgressStatus::InProgress;
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
            }
            ProgressStatus::NotStarted => {
                self.status = ProgressStatus::NotStarted;
            }
        }
    }

    /// Manual completion: bypasses the watch threshold entirely. The caller
    /// (the completion gate) is responsible for the quiz prerequisite check.
    pub fn force_complete(&mut self, now: OffsetDateTime) {
        self.status = ProgressStatus::Completed;
        self.completed = true;
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.progress_percent = 100;
        self.last_accessed_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn fresh_record() -> UserProgress {
        UserProgress {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            lesson_id: Uuid::nil(),
            status: ProgressStatus::NotStarted,
            completed: false,
            completed_at: None,
            progress_percent: 0,
            watch_percentage: 0.0,
            last_position_secs: 0.0,
            completion_threshold: 90.0,
            started_at: None,
            last_accessed_at: datetime!(2026-01-01 00:00 UTC),
            created_at: datetime!(2026-01-01 00:00 UTC),
            updated_at: datetime!(2026-01-01 00:00 UTC),
        }
    }

    #[test]
    fn derive_status_branches() {
        assert_eq!(derive_status(0.0, 90.0), ProgressStatus::NotStarted);
        assert_eq!(derive_status(0.1, 90.0), ProgressStatus::InProgress);
        assert_eq!(derive_status(89.9, 90.0), ProgressStatus::InProgress);
        assert_eq!(derive_status(90.0, 90.0), ProgressStatus::Completed);
        assert_eq!(derive_status(100.0, 90.0), ProgressStatus::Completed);
    }

    #[test]
    fn first_sample_starts_the_record() {
        let mut record = fresh_record();
        let now = datetime!(2026-02-01 10:00 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 45.5,
                position_secs: 120.5,
            },
            now,
        );

        assert_eq!(record.status, ProgressStatus::InProgress);
        assert_eq!(record.started_at, Some(now));
        assert_eq!(record.completed_at, None);
        assert!(!record.completed);
        assert_eq!(record.watch_percentage, 45.5);
        assert_eq!(record.last_position_secs, 120.5);
        assert_eq!(record.progress_percent, 45);
        assert_eq!(record.last_accessed_at, now);
    }

    #[test]
    fn crossing_the_threshold_completes_once() {
        let mut record = fresh_record();
        let t1 = datetime!(2026-02-01 10:00 UTC);
        let t2 = datetime!(2026-02-01 10:05 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 45.5,
                position_secs: 120.5,
            },
            t1,
        );
        record.apply_sample(
            ProgressSample {
                watch_percentage: 92.0,
                position_secs: 300.0,
            },
            t2,
        );

        assert_eq!(record.status, ProgressStatus::Completed);
        assert!(record.completed);
        assert_eq!(record.completed_at, Some(t2));
        assert_eq!(record.progress_percent, 92);
    }

    #[test]
    fn completion_is_sticky_but_percentage_regresses() {
        let mut record = fresh_record();
        let t1 = datetime!(2026-02-01 10:00 UTC);
        let t2 = datetime!(2026-02-01 10:05 UTC);
        let t3 = datetime!(2026-02-01 10:10 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 92.0,
                position_secs: 300.0,
            },
            t1,
        );
        record.apply_sample(
            ProgressSample {
                watch_percentage: 92.0,
                position_secs: 301.0,
            },
            t2,
        );
        // Idempotent: the second high sample must not move completed_at.
        assert_eq!(record.completed_at, Some(t1));

        // A stale lower sample regresses the displayed percentage but never
        // the completion state.
        record.apply_sample(
            ProgressSample {
                watch_percentage: 60.0,
                position_secs: 200.0,
            },
            t3,
        );
        assert_eq!(record.status, ProgressStatus::Completed);
        assert!(record.completed);
        assert_eq!(record.completed_at, Some(t1));
        assert_eq!(record.watch_percentage, 60.0);
        assert_eq!(record.progress_percent, 60);
        assert_eq!(record.last_accessed_at, t3);
    }

    #[test]
    fn out_of_range_samples_are_clamped_not_rejected() {
        let mut record = fresh_record();
        let t1 = datetime!(2026-02-01 10:00 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: -5.0,
                position_secs: 0.0,
            },
            t1,
        );
        assert_eq!(record.watch_percentage, 0.0);
        assert_eq!(record.status, ProgressStatus::NotStarted);
        assert_eq!(record.started_at, None);

        let t2 = datetime!(2026-02-01 10:01 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 250.0,
                position_secs: 10.0,
            },
            t2,
        );
        assert_eq!(record.watch_percentage, 100.0);
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.completed_at, Some(t2));
    }

    #[test]
    fn started_at_is_set_at_most_once() {
        let mut record = fresh_record();
        let t1 = datetime!(2026-02-01 10:00 UTC);
        let t2 = datetime!(2026-02-01 10:05 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 10.0,
                position_secs: 5.0,
            },
            t1,
        );
        record.apply_sample(
            ProgressSample {
                watch_percentage: 20.0,
                position_secs: 15.0,
            },
            t2,
        );
        assert_eq!(record.started_at, Some(t1));
    }

    #[test]
    fn force_complete_bypasses_threshold() {
        let mut record = fresh_record();
        let t1 = datetime!(2026-02-01 10:00 UTC);
        record.apply_sample(
            ProgressSample {
                watch_percentage: 12.0,
                position_secs: 30.0,
            },
            t1,
        );

        let t2 = datetime!(2026-02-01 10:30 UTC);
        record.force_complete(t2);
        assert_eq!(record.status, ProgressStatus::Completed);
        assert!(record.completed);
        assert_eq!(record.completed_at, Some(t2));
        assert_eq!(record.progress_percent, 100);
        // The raw watch percentage is left as reported.
        assert_eq!(record.watch_percentage, 12.0);

        // Completing again keeps the original completion time.
        let t3 = datetime!(2026-02-01 11:00 UTC);
        record.force_complete(t3);
        assert_eq!(record.completed_at, Some(t2));
    }

    #[test]
    fn completed_iff_completed_at_set() {
        let mut record = fresh_record();
        assert_eq!(record.status == ProgressStatus::Completed, record.completed_at.is_some());
        record.apply_sample(
            ProgressSample {
                watch_percentage: 95.0,
                position_secs: 400.0,
            },
            datetime!(2026-02-01 10:00 UTC),
        );
        assert_eq!(record.status == ProgressStatus::Completed, record.completed_at.is_some());
        assert!(record.completed);
    }
}
