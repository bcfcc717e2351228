use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{
    LessonQuiz, LessonQuizAttempt, LessonRepository, LessonWithCourse, ProgressRepository,
    ProgressSample, ProgressStatus, QuizRepository, UserProgress, UserRepository,
};
use crate::error::{AppError, AppResult};
use crate::middleware::current_user::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct ProgressSamplePayload {
    pub watch_percentage: f64,
    /// Playback offset in seconds at the time of the sample.
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub watch_percentage: f64,
    pub status: ProgressStatus,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub success: bool,
    pub message: String,
    pub lesson_id: Uuid,
}

async fn resolve_lesson(state: &AppState, lesson_id: Uuid) -> AppResult<LessonWithCourse> {
    LessonRepository::find_with_course(&state.db, lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> AppResult<()> {
    if UserRepository::exists(&state.db, user_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("User {} not found", user_id)))
    }
}

/// Applies one watch-percentage sample to the caller's progress record.
/// Out-of-range percentages are clamped, not rejected; a failed sample is
/// non-fatal to playback, the client simply retries on its next interval.
pub async fn update_lesson_progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<ProgressSamplePayload>,
) -> AppResult<Json<ProgressResponse>> {
    ensure_user_exists(&state, user_id).await?;
    resolve_lesson(&state, lesson_id).await?;

    let record = apply_progress_sample(
        &state,
        user_id,
        lesson_id,
        ProgressSample {
            watch_percentage: payload.watch_percentage,
            position_secs: payload.timestamp,
        },
    )
    .await?;

    Ok(Json(ProgressResponse {
        success: true,
        watch_percentage: record.watch_percentage,
        status: record.status,
        completed: record.completed,
    }))
}

async fn apply_progress_sample(
    state: &AppState,
    user_id: Uuid,
    lesson_id: Uuid,
    sample: ProgressSample,
) -> AppResult<UserProgress> {
    let mut tx = state.db.begin().await?;

    let mut record = ProgressRepository::get_or_create_for_update(
        &mut tx,
        user_id,
        lesson_id,
        state.env.progress.completion_threshold,
    )
    .await?;

    record.apply_sample(sample, OffsetDateTime::now_utc());
    ProgressRepository::save(&mut tx, &record).await?;

    tx.commit().await?;
    Ok(record)
}

/// The gate decision, separated from the lookups so the denial rules are
/// testable on their own: no required quiz passes, a required quiz passes
/// only with a passing attempt on record, and a failed lookup denies
/// (fail closed: an unreachable quiz store must never let a completion
/// through). The progress record is only touched after this returns Ok.
fn gate_decision(
    required_quiz: Option<&LessonQuiz>,
    passing_attempt: Result<Option<LessonQuizAttempt>, sqlx::Error>,
    quiz_url: &str,
) -> AppResult<()> {
    let Some(quiz) = required_quiz else {
        return Ok(());
    };

    let passing_attempt = match passing_attempt {
        Ok(attempt) => attempt,
        Err(err) => {
            warn!(error = %err, quiz_id = %quiz.id, "quiz result lookup failed; denying completion");
            None
        }
    };

    if passing_attempt.is_none() {
        return Err(AppError::QuizNotPassed {
            quiz_url: quiz_url.to_string(),
        });
    }

    Ok(())
}

/// Marks a lesson complete for the caller, independent of the watch
/// threshold. When the lesson carries a required quiz, a passing attempt
/// must exist; a failed quiz-result lookup denies completion rather than
/// waving it through.
pub async fn complete_lesson(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(lesson_id): Path<Uuid>,
) -> AppResult<Json<CompleteResponse>> {
    ensure_user_exists(&state, user_id).await?;
    let lesson = resolve_lesson(&state, lesson_id).await?;

    let required_quiz = QuizRepository::required_quiz_for_lesson(&state.db, lesson_id).await?;
    let passing_attempt = match &required_quiz {
        Some(quiz) => QuizRepository::latest_passing_attempt(&state.db, quiz.id, user_id).await,
        None => Ok(None),
    };
    gate_decision(required_quiz.as_ref(), passing_attempt, &lesson.quiz_url())?;

    let mut tx = state.db.begin().await?;
    let mut record = ProgressRepository::get_or_create_for_update(
        &mut tx,
        user_id,
        lesson_id,
        state.env.progress.completion_threshold,
    )
    .await?;

    record.force_complete(OffsetDateTime::now_utc());
    ProgressRepository::save(&mut tx, &record).await?;
    tx.commit().await?;

    Ok(Json(CompleteResponse {
        success: true,
        message: "Lesson marked as complete".to_string(),
        lesson_id,
    }))
}
