use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use garde::Validate;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{ApiError, INVALID_JSON_MESSAGE};

/// Form body extractor: deserializes JSON, then runs the `garde` rules.
///
/// Malformed bodies and rule violations both become `400` with a readable message.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate<Context = ()> + 'static,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_) => {
                    ApiError::BadRequest(INVALID_JSON_MESSAGE.to_string())
                }
                other => ApiError::BadRequest(other.body_text()),
            })?;

        if let Err(report) = value.validate() {
            debug!(errors = %report, "Rejected form input");
            return Err(ApiError::BadRequest(report.to_string()));
        }

        Ok(ValidJson(value))
    }
}
