// HTTP rendering of assistant errors

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AssistantError;

/// JSON error body: `{"error": ..., "code": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl AssistantError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.is_not_configured() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let body = ApiError {
            error: self.user_message(),
            code: self.code().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Message returned for any body that cannot be read as the route's JSON
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Anything a handler can fail with
#[derive(Debug)]
pub enum HandlerError {
    Assistant(AssistantError),
    InvalidBody(JsonRejection),
}

impl From<AssistantError> for HandlerError {
    fn from(err: AssistantError) -> Self {
        HandlerError::Assistant(err)
    }
}

impl From<JsonRejection> for HandlerError {
    fn from(rejection: JsonRejection) -> Self {
        HandlerError::InvalidBody(rejection)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Assistant(err) => err.into_response(),
            HandlerError::InvalidBody(rejection) => {
                tracing::warn!(
                    status = %rejection.status(),
                    reason = %rejection.body_text(),
                    "Rejected request body"
                );
                let body = ApiError {
                    error: INVALID_BODY_MESSAGE.to_string(),
                    code: "INVALID_REQUEST".to_string(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
