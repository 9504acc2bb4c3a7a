//! API error handling for consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::MeetingError;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<MeetingError> for ApiError {
    fn from(err: MeetingError) -> Self {
        let status = match &err {
            MeetingError::ConsentRequired => StatusCode::BAD_REQUEST,
            MeetingError::AlreadyLive
            | MeetingError::NotLive
            | MeetingError::SessionEnded => StatusCode::CONFLICT,
            MeetingError::AssistantLocked(_) => StatusCode::FORBIDDEN,
            MeetingError::PermissionDenied { .. } | MeetingError::DeviceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            MeetingError::BootstrapFailed(_)
            | MeetingError::ChannelOpenFailed { .. }
            | MeetingError::ChannelTransport { .. }
            | MeetingError::SummarizationFailed(_)
            | MeetingError::ExtractionFailed(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_maps_to_bad_request() {
        let api_err = ApiError::from(MeetingError::ConsentRequired);
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_lifecycle_errors_map_to_conflict() {
        assert_eq!(
            ApiError::from(MeetingError::AlreadyLive).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(MeetingError::NotLive).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_capture_errors_map_to_service_unavailable() {
        let api_err = ApiError::from(MeetingError::DeviceUnavailable("no track".to_string()));
        assert_eq!(api_err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_locked_assistant_maps_to_forbidden() {
        let api_err = ApiError::from(MeetingError::AssistantLocked("basic".to_string()));
        assert_eq!(api_err.status, StatusCode::FORBIDDEN);
    }
}
