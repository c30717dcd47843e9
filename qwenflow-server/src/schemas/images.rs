use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for `POST /api/image-edit`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ImageEditRequest {
    /// Source images; blank entries are ignored.
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Vec<String>,
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
}
