//! Text routes: prompt echo, chat completion and vision understanding.
//!
//! Chat and vision both go through DashScope's OpenAI-compatible
//! chat-completions endpoint and return the assistant text as
//! `{"result": "..."}`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::extract;
use crate::routes::body::ValidatedJson;
use crate::schemas::ResultResponse;
use crate::schemas::chat::{ChatRequest, PromptRequest, VisionRequest};
use crate::state::AppState;
use crate::upstream::{DEFAULT_TIMEOUT, Endpoint};

/// Model used for image understanding.
pub const VISION_MODEL: &str = "qwen-vl-plus";

/// Returned when the completion carries no assistant text.
const CHAT_FALLBACK: &str = "文本生成失败";
const VISION_FALLBACK: &str = "未能识别图片";

#[derive(OpenApi)]
#[openapi(
    paths(prompt, chat, vision),
    components(schemas(PromptRequest, ChatRequest, VisionRequest))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompt", post(prompt))
        .route("/chat", post(chat))
        .route("/vision", post(vision))
}

/// Text input node (`POST /api/prompt`): returns the prompt unchanged.
#[utoipa::path(
    post,
    path = "/api/prompt",
    tag = "text",
    request_body = PromptRequest,
    responses((status = 200, description = "The prompt", body = Value))
)]
pub async fn prompt(
    ValidatedJson(req): ValidatedJson<PromptRequest>,
) -> Json<ResultResponse<String>> {
    Json(ResultResponse::new(req.prompt))
}

/// Text generation (`POST /api/chat`).
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "text",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Generated text", body = Value),
        (status = 422, description = "Invalid request body"),
        (status = 500, description = "Provider error"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ResultResponse<String>>, ServerError> {
    debug!(model = %req.model, prompt_len = req.prompt.len(), "chat request");

    let data = state
        .upstream
        .call(Endpoint::ChatCompletions, Some(chat_payload(&req)), DEFAULT_TIMEOUT)
        .await?;

    let text = extract::chat_content(&data).unwrap_or_else(|| CHAT_FALLBACK.to_owned());
    info!(model = %req.model, output_len = text.len(), "chat completion done");
    Ok(Json(ResultResponse::new(text)))
}

/// Image understanding (`POST /api/vision`).
#[utoipa::path(
    post,
    path = "/api/vision",
    tag = "text",
    request_body = VisionRequest,
    responses(
        (status = 200, description = "Description of the image", body = Value),
        (status = 422, description = "Invalid request body"),
        (status = 500, description = "Provider error"),
    )
)]
pub async fn vision(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<VisionRequest>,
) -> Result<Json<ResultResponse<String>>, ServerError> {
    debug!(image_url = %req.image_url, "vision request");

    let data = state
        .upstream
        .call(Endpoint::ChatCompletions, Some(vision_payload(&req)), DEFAULT_TIMEOUT)
        .await?;

    let text = extract::chat_content(&data).unwrap_or_else(|| VISION_FALLBACK.to_owned());
    Ok(Json(ResultResponse::new(text)))
}

fn chat_payload(req: &ChatRequest) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = req.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": req.prompt }));
    json!({
        "model": req.model,
        "messages": messages,
        "temperature": req.temperature,
    })
}

fn vision_payload(req: &VisionRequest) -> Value {
    json!({
        "model": VISION_MODEL,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "image_url", "image_url": { "url": req.image_url } },
                { "type": "text", "text": req.prompt },
            ]
        }]
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn request(system_prompt: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: "qwen-plus".into(),
            system_prompt: system_prompt.map(str::to_owned),
            prompt: "hello".into(),
            temperature: 0.5,
        }
    }

    #[test]
    fn blank_system_prompt_is_omitted() {
        let payload = chat_payload(&request(Some("")));
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn system_prompt_comes_first() {
        let payload = chat_payload(&request(Some("be brief")));
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], "be brief");
        assert_eq!(payload["messages"][1]["content"], "hello");
        assert_eq!(payload["temperature"], 0.5);
    }

    #[test]
    fn vision_payload_puts_image_before_text() {
        let payload = vision_payload(&VisionRequest {
            image_url: "https://img/a.png".into(),
            prompt: "what is this".into(),
        });
        assert_eq!(payload["model"], VISION_MODEL);
        let content = &payload["messages"][0]["content"];
        assert_eq!(content[0]["image_url"]["url"], "https://img/a.png");
        assert_eq!(content[1]["text"], "what is this");
    }
}
