//! Request extractors with JSON rejections.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, OriginalUri, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::error::AppError;

/// Like [`Path`], but a segment that cannot be decoded (e.g. invalid UTF-8)
/// is answered with the JSON 404 instead of axum's plain-text 400.
///
/// Such a segment can never name a known station or a live service.
#[derive(Debug)]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParams(value)),
            Err(rejection) => {
                let path = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map(|OriginalUri(uri)| uri.path().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                Err(AppError::NotFound {
                    path,
                    message: rejection.body_text(),
                })
            }
        }
    }
}
