use crate::routes::{chat, health, images, video};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "qwenflow-server",
    description = "QwenFlow API gateway for DashScope text, image, vision and video generation",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(images::ImagesApi::openapi());
    root.merge(video::VideoApi::openapi());
    root
}
