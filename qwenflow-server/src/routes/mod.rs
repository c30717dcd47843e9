//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document (disable with `QWENFLOW_ENABLE_SWAGGER=false`)
//! - Health route
//! - The `/api` routes used by the QwenFlow front-end
//! - The front-end bundle itself, when `QWENFLOW_STATIC_DIR` exists

mod body;
mod chat;
pub mod doc;
mod health;
mod images;
mod video;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(chat::router())
        .merge(images::router())
        .merge(video::router())
        .fallback(api_not_found);

    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    let static_dir = Path::new(&state.config.static_dir);
    if static_dir.is_dir() {
        info!(dir = %static_dir.display(), "serving front-end bundle");
        // Unknown paths fall back to index.html so client-side routes work.
        let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
        app = app.fallback_service(spa);
    } else {
        app = app.fallback(api_not_found);
    }

    app
        .layer(cors::cors_layer(&state))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn api_not_found() -> ServerError {
    ServerError::NotFound("Not Found".to_owned())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
