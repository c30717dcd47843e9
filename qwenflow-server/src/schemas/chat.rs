use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for `POST /api/prompt` and `POST /api/image`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatRequest {
    /// Model identifier (default `"qwen-plus"`).
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Optional system prompt; blank means none.
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub prompt: String,
    /// Sampling temperature in [0, 2] (default `0.7`).
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0, message = "temperature must be between 0 and 2"))]
    pub temperature: f32,
}

fn default_chat_model() -> String {
    "qwen-plus".to_owned()
}

fn default_temperature() -> f32 {
    0.7
}

/// Request body for `POST /api/vision`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct VisionRequest {
    #[validate(length(min = 1, message = "image_url must not be empty"))]
    pub image_url: String,
    pub prompt: String,
}
