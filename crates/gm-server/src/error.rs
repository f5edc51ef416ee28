use crate::types::ErrorResponse;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gm_core::Error;

/// Error returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status for a domain error
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::UnknownTool(_) => StatusCode::NOT_FOUND,
        Error::ToolExecution { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::ModelResponseFormat(_) | Error::UpstreamAuth { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %err, status = %status, "Request rejected");
        }
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::InvalidInput("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::UnknownTool("castSpell".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::tool_failed("diceRoll", anyhow::anyhow!("bad dice"))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&Error::ModelUnavailable("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&Error::upstream_auth(403, "denied")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&Error::config_error("broken")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
