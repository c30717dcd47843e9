//! Image generation and editing routes.
//!
//! Both call DashScope's native multimodal-generation endpoint and return
//! the first generated image URL as `{"result": "..."}`.

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
use crate::schemas::chat::PromptRequest;
use crate::schemas::images::ImageEditRequest;
use crate::state::AppState;
use crate::upstream::{Endpoint, IMAGE_TIMEOUT};

pub const IMAGE_MODEL: &str = "qwen-image-max";
pub const IMAGE_EDIT_MODEL: &str = "qwen-image-edit-plus";
const IMAGE_SIZE: &str = "1104*1472";

#[derive(OpenApi)]
#[openapi(paths(generate_image, edit_image), components(schemas(ImageEditRequest)))]
pub struct ImagesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/image", post(generate_image))
        .route("/image-edit", post(edit_image))
}

/// Text-to-image (`POST /api/image`).
#[utoipa::path(
    post,
    path = "/api/image",
    tag = "images",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Generated image URL", body = Value),
        (status = 500, description = "Provider error or no image in response"),
    )
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PromptRequest>,
) -> Result<Json<ResultResponse<String>>, ServerError> {
    debug!(prompt_len = req.prompt.len(), "image generation request");

    let payload = json!({
        "model": IMAGE_MODEL,
        "input": { "messages": [{ "role": "user", "content": [{ "text": req.prompt }] }] },
        "parameters": { "size": IMAGE_SIZE },
    });
    let data = state
        .upstream
        .call(Endpoint::MultimodalGeneration, Some(payload), IMAGE_TIMEOUT)
        .await?;

    let url = extract::first_image(&data)
        .ok_or_else(|| ServerError::NoResult(format!("未获取到图片URL，API响应: {data}")))?;
    info!(model = IMAGE_MODEL, "image generation done");
    Ok(Json(ResultResponse::new(url)))
}

/// Image editing (`POST /api/image-edit`).
#[utoipa::path(
    post,
    path = "/api/image-edit",
    tag = "images",
    request_body = ImageEditRequest,
    responses(
        (status = 200, description = "Edited image URL", body = Value),
        (status = 422, description = "Invalid request body"),
        (status = 500, description = "Provider error or no image in response"),
    )
)]
pub async fn edit_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ImageEditRequest>,
) -> Result<Json<ResultResponse<String>>, ServerError> {
    debug!(images = req.images.len(), "image edit request");

    let data = state
        .upstream
        .call(Endpoint::MultimodalGeneration, Some(edit_payload(&req)), IMAGE_TIMEOUT)
        .await?;

    let url = extract::first_image(&data)
        .ok_or_else(|| ServerError::NoResult(format!("未获取到编辑后的图片，API响应: {data}")))?;
    info!(model = IMAGE_EDIT_MODEL, "image edit done");
    Ok(Json(ResultResponse::new(url)))
}

fn edit_payload(req: &ImageEditRequest) -> Value {
    let mut content: Vec<Value> = req
        .images
        .iter()
        .map(|img| img.trim())
        .filter(|img| !img.is_empty())
        .map(|img| json!({ "image": img }))
        .collect();
    content.push(json!({ "text": req.prompt }));

    json!({
        "model": IMAGE_EDIT_MODEL,
        "input": { "messages": [{ "role": "user", "content": content }] },
        "parameters": {
            "n": 1,
            "negative_prompt": req.negative_prompt.as_deref().unwrap_or_default(),
            "prompt_extend": true,
            "watermark": false,
        }
    })
}
