//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ecohub_domain::error::{EcoHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`EcoHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(EcoHubError);

impl From<EcoHubError> for ApiError {
    fn from(err: EcoHubError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EcoHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            EcoHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            EcoHubError::Storage(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
