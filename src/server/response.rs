//! The HTTP response envelope and error mapping.
//!
//! Every endpoint answers `{success, message, data?, error_code?}`; failures
//! pick their status from the error taxonomy: validation problems are the
//! caller's fault (400), everything else is ours (500). Internal errors keep
//! their detail in the logs only.

use crate::error::ScanError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform envelope for every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error_code: None,
        }
    }

    pub fn error(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_code: Some(error_code.into()),
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ScanError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ScanError::FileProcessing(_) | ScanError::FileNotFound { .. } => {
                tracing::error!("file processing failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("file processing failed: {}", self),
                )
            }
            ScanError::Recognition(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ScanError::Analysis(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // Internal detail stays in the logs.
            ScanError::InvalidConfig(_)
            | ScanError::PdfiumBindingFailed(_)
            | ScanError::Internal(_) => {
                tracing::error!("unhandled internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(message, self.error_code()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let r = ApiResponse::success(serde_json::json!({"k": 1}), "done");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"]["k"], 1);
        assert!(json.get("error_code").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let r = ApiResponse::<()>::error("bad input", "VALIDATION_ERROR");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "VALIDATION_ERROR");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn internal_error_hides_detail() {
        let response = ScanError::Internal("secret connection string".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_is_bad_request() {
        let response = ScanError::Validation("no file selected".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
