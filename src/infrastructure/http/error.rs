//! HTTP Error Handling
//!
//! 错误响应采用 OpenAI 兼容的信封格式：
//! `{"error": {"message": "...", "type": "...", "param": ..., "code": ...}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 错误信封内层
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub param: Option<&'static str>,
    pub code: Option<&'static str>,
}

/// OpenAI 兼容的错误信封
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(
        message: impl Into<String>,
        error_type: &'static str,
        param: Option<&'static str>,
    ) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                error_type,
                param,
                code: None,
            },
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// 请求不合法（字段缺失、模型未知、格式不支持等）
    BadRequest {
        message: String,
        param: Option<&'static str>,
    },
    /// 下游合成引擎失败
    UpstreamEngine(String),
    /// 服务内部错误
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            ApiError::BadRequest { message, param } => {
                tracing::warn!(error = %message, param = ?param, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope::new(message, "invalid_request_error", param),
                )
            }
            ApiError::UpstreamEngine(message) => {
                tracing::error!(error = %message, "Synthesis engine error");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorEnvelope::new(message, "engine_error", None),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope::new(message, "server_error", None),
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let param = e.param();
        let message = e.to_string();
        match e {
            ApplicationError::MissingField(_)
            | ApplicationError::ModelNotAvailable { .. }
            | ApplicationError::UnsupportedFormat(_)
            | ApplicationError::SpeakerResolution(_) => ApiError::BadRequest { message, param },
            ApplicationError::Synthesis(_) => ApiError::UpstreamEngine(message),
            ApplicationError::Transcode(_) | ApplicationError::Internal(_) => {
                ApiError::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_request_maps_to_400_envelope() {
        let err = ApiError::from(ApplicationError::MissingField("input"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "input");
    }

    #[tokio::test]
    async fn test_synthesis_error_maps_to_502() {
        let err = ApiError::from(ApplicationError::Synthesis("engine down".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_transcode_error_maps_to_500() {
        let err = ApiError::from(ApplicationError::Transcode("bad wav".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
