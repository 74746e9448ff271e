//! Speech Handler - OpenAI 兼容的语音合成端点

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::infrastructure::http::dto::CreateSpeechRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /v1/audio/speech
///
/// 成功时返回转码后的音频字节，Content-Type 随 response_format 变化
pub async fn create_speech(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSpeechRequest>,
) -> Result<Response, ApiError> {
    let output = state.speech_handler.handle(req.into()).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type)
        .header(header::CONTENT_LENGTH, output.audio_data.len())
        .body(Body::from(output.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
