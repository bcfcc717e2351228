use axum::{routing::get, Router};

use crate::app_state::AppState;

use super::handlers::{activity_feed, dashboard};

pub fn feed_routes() -> Router<AppState> {
    Router::new()
        .route("/activity-feed", get(activity_feed))
        .route("/dashboard", get(dashboard))
}
