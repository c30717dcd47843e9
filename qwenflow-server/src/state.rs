//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::upstream::Upstream;
use crate::video::{PollBudget, VideoGateway};

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Provider access used by the single-shot endpoints.
    pub upstream: Arc<dyn Upstream>,
    /// Video job submission and polling.
    pub video: VideoGateway,
    /// Cancelled on graceful shutdown; waiting requests derive child tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>, budget: PollBudget) -> Self {
        let video = VideoGateway::new(Arc::clone(&upstream), budget, config.video_model.clone());
        Self {
            config: Arc::new(config),
            upstream,
            video,
            shutdown: CancellationToken::new(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}
