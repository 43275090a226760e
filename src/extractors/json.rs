//! JSON body guard: rejects non-JSON requests with a 400 in the common error shape.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

/// Like `axum::Json`, but rejections use the common error shape: a body over the
/// configured limit is `AppError::PayloadTooLarge`, anything else `AppError::BadRequest`.
#[derive(Clone, Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::debug!(%rejection, "json body over limit");
                Err(AppError::PayloadTooLarge("Request body too large".into()))
            }
            Err(rejection) => {
                tracing::debug!(%rejection, "json body rejected");
                Err(AppError::BadRequest("Request must be JSON".into()))
            }
        }
    }
}
