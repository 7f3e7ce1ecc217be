use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Logs every request with its status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    tracing::info!("Request started: {} {}", method, uri);

    let response = next.run(request).await;

    tracing::info!(
        "Request completed: {} {} | status={} | latency={:?}",
        method,
        uri,
        response.status(),
        start.elapsed()
    );

    response
}
