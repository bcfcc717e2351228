use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;

use crate::app_state::AppState;

use super::activity::Activity;
use super::aggregator;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub activities: Vec<Activity>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub poll_interval_secs: u64,
}

/// The aggregated feed as structured data. Recomputed fresh on every
/// request; consumers re-poll on `poll_interval_secs` rather than being
/// pushed to.
pub async fn activity_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let limit = query
        .limit
        .unwrap_or(state.env.feed.default_limit)
        .max(1);

    let activities = aggregator::get_activity_feed(
        &state.db,
        limit,
        state.env.progress.significant_progress_floor,
    )
    .await;

    Json(FeedResponse {
        activities,
        generated_at: OffsetDateTime::now_utc(),
        poll_interval_secs: state.env.feed.poll_interval_secs,
    })
}

/// The dashboard shell shows a short digest and polls with its own limit,
/// smaller than the feed default a direct `/activity-feed` consumer gets.
const DASHBOARD_FEED_LIMIT: i64 = 10;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    poll_interval_secs: u64,
    feed_limit: i64,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Failed to render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Instructor-facing dashboard shell. The feed region is filled and refreshed
/// client-side against `/activity-feed`.
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(DashboardTemplate {
        poll_interval_secs: state.env.feed.poll_interval_secs,
        feed_limit: DASHBOARD_FEED_LIMIT,
    })
}
