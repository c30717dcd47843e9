//! Request / response types for the `/api` surface.
//!
//! Field names and defaults follow what the QwenFlow front-end sends, so
//! existing workflow graphs keep working unchanged.

pub mod chat;
pub mod images;
pub mod video;

use serde::Serialize;

/// Envelope used by every single-result endpoint: `{"result": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

impl<T> ResultResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}
