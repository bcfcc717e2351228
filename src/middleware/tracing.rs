use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Request-span middleware: every request runs inside a span carrying the
/// method, matched route and a fresh request id, and logs its outcome with
/// latency on completion.
pub async fn observability_middleware(
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = matched_path
        .as_ref()
        .map(|path| path.as_str())
        .unwrap_or("unmatched")
        .to_string();
    let start_time = Instant::now();

    let tracing_span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    let response = next.run(request).instrument(tracing_span).await;

    let status_code = response.status().as_u16();
    let latency_ms = start_time.elapsed().as_millis() as u64;

    if status_code >= 500 {
        warn!(
            method = %method,
            route = %route,
            status = status_code,
            latency_ms,
            "request failed"
        );
    } else {
        info!(
            method = %method,
            route = %route,
            status = status_code,
            latency_ms,
            "request completed"
        );
    }

    response
}
