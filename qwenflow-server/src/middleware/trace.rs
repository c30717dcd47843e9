use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies up to this size are logged at debug level.
const MAX_LOGGED_BODY: usize = 1024;

/// Upper bound for buffering a body; same as axum's default body limit.
const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace id when it is a valid UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");
        let (parts, body) = req.into_parts();
        let response = match log_json_body("request", &parts.headers, body).await {
            Ok(body) => {
                let mut req = Request::from_parts(parts, body);
                if let Some(value) = &trace_header {
                    req.headers_mut().insert(X_TRACE_ID, value.clone());
                }
                next.run(req).await
            }
            Err(e) => e.into_response(),
        };

        let (parts, body) = response.into_parts();
        let mut response = match log_json_body("response", &parts.headers, body).await {
            Ok(body) => Response::from_parts(parts, body),
            Err(e) => ServerError::Internal(format!("failed to buffer response body: {}", e.detail()))
                .into_response(),
        };
        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Log small JSON bodies; every other body is passed through untouched so
/// static assets are never buffered.
async fn log_json_body(direction: &str, headers: &HeaderMap, body: Body) -> Result<Body, ServerError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json || !tracing::enabled!(tracing::Level::DEBUG) {
        return Ok(body);
    }

    let bytes = buffer_body(body, MAX_BUFFERED_BODY).await.inspect_err(|e| {
        warn!(direction, error = %e, "failed to buffer body for logging");
    })?;

    if bytes.len() <= MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!(direction, body = text, "json body");
        }
    } else {
        debug!(direction, size = bytes.len(), "json body [skipped: too large]");
    }

    Ok(Body::from(bytes))
}

/// Collect at most `limit` bytes of `body`.
async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, ServerError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ServerError::PayloadTooLarge(format!(
            "body exceeds {limit} bytes"
        ))),
        Err(e) => Err(ServerError::BadRequest(format!("failed to read body: {e}"))),
    }
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn echo_app() -> Router {
        Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(axum::middleware::from_fn(trace_middleware))
    }

    fn failing_body() -> Body {
        Body::from_stream(futures::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"{\"prompt\"")),
            Err(std::io::Error::other("connection reset")),
        ]))
    }

    fn debug_logging() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    async fn post_json(app: Router, body: Body) -> (StatusCode, Value) {
        let req = Request::post("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn buffer_body_within_limit() {
        let bytes = buffer_body(Body::from("{}"), 16).await.unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn buffer_body_over_limit_is_413() {
        let err = buffer_body(Body::from(vec![b'a'; 17]), 16).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn buffer_body_read_failure_is_400() {
        let err = buffer_body(failing_body(), 1024).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.detail().contains("connection reset"), "{}", err.detail());
    }

    #[tokio::test]
    async fn unreadable_request_body_is_rejected_when_bodies_are_logged() {
        let _logging = debug_logging();
        let (status, body) = post_json(echo_app(), failing_body()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn oversized_request_body_is_rejected_when_bodies_are_logged() {
        let _logging = debug_logging();
        let (status, _) = post_json(echo_app(), Body::from(vec![b' '; MAX_BUFFERED_BODY + 1])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn logged_request_body_reaches_the_handler_intact() {
        let _logging = debug_logging();
        let app = echo_app();
        let req = Request::post("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"prompt":"hi"}"#))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_TRACE_ID));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"prompt":"hi"}"#);
    }
}
