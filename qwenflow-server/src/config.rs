//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use crate::video::poller::{BudgetError, PollBudget};

/// Default DashScope API root.
pub const DEFAULT_DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com";

/// Default image-to-video model used by `POST /api/video`.
pub const DEFAULT_VIDEO_MODEL: &str = "wan2.5-i2v-preview";

/// Runtime configuration for qwenflow-server.
///
/// Every field has a sensible default so the server starts without any
/// environment variables set. Calls to the provider will fail with a 401
/// until `DASHSCOPE_API_KEY` is provided.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`, port taken from `PORT`).
    pub bind_address: String,

    /// Bearer credential for the DashScope API.
    pub dashscope_api_key: Option<String>,

    /// Provider root URL; endpoint paths are appended to it.
    pub dashscope_base_url: String,

    /// Model name sent with video synthesis jobs.
    pub video_model: String,

    /// How long a synchronous video request may wait for its job.
    pub video_max_wait: Duration,

    /// Delay between two status probes while waiting.
    pub video_poll_interval: Duration,

    /// Directory holding the built front-end bundle.
    pub static_dir: String,

    /// Comma-separated list of allowed CORS origins (`None` = any origin).
    pub cors_allowed_origins: Option<String>,

    /// Mount Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let port = env_or("PORT", "8000");
        Self {
            bind_address: env_or("QWENFLOW_BIND", &format!("0.0.0.0:{port}")),
            dashscope_api_key: std::env::var("DASHSCOPE_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            dashscope_base_url: env_or("DASHSCOPE_BASE_URL", DEFAULT_DASHSCOPE_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            video_model: env_or("QWENFLOW_VIDEO_MODEL", DEFAULT_VIDEO_MODEL),
            video_max_wait: Duration::from_secs(parse_env("QWENFLOW_VIDEO_MAX_WAIT_SECS", 600)),
            video_poll_interval: Duration::from_secs(parse_env(
                "QWENFLOW_VIDEO_POLL_INTERVAL_SECS",
                10,
            )),
            static_dir: env_or("QWENFLOW_STATIC_DIR", "static"),
            cors_allowed_origins: std::env::var("QWENFLOW_CORS_ORIGINS").ok(),
            enable_swagger: parse_bool("QWENFLOW_ENABLE_SWAGGER", true),
            log_level: env_or("QWENFLOW_LOG", "info"),
            log_json: parse_bool("QWENFLOW_LOG_JSON", false),
        }
    }

    /// The wait budget used by synchronous video requests.
    pub fn poll_budget(&self) -> Result<PollBudget, BudgetError> {
        PollBudget::new(self.video_max_wait, self.video_poll_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            dashscope_api_key: None,
            dashscope_base_url: DEFAULT_DASHSCOPE_BASE_URL.to_owned(),
            video_model: DEFAULT_VIDEO_MODEL.to_owned(),
            video_max_wait: Duration::from_secs(600),
            video_poll_interval: Duration::from_secs(10),
            static_dir: "static".to_owned(),
            cors_allowed_origins: None,
            enable_swagger: true,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
