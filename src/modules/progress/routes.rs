use axum::{routing::post, Router};

use crate::app_state::AppState;

use super::handlers::{complete_lesson, update_lesson_progress};

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/lessons/{lesson_id}/progress", post(update_lesson_progress))
        .route("/lessons/{lesson_id}/complete", post(complete_lesson))
}
