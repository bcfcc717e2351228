use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{feed::feed_routes, progress::progress_routes},
};

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.env.app.static_dir.to_string();

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .merge(progress_routes())
        .merge(feed_routes())
        .nest_service(
            "/static",
            tower_http::services::ServeDir::new(static_dir),
        )
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn hello() -> &'static str {
    "LMS Backend says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "timestamp": time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
