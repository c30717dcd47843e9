//! JSON body extractor with validation.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// Like [`axum::Json`], but runs [`Validate`] on the body and reports both
/// parse and validation failures as `422 {"detail": ...}`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Unprocessable(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| ServerError::Unprocessable(e.to_string()))?;
        Ok(Self(value))
    }
}
