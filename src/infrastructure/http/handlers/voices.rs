//! Voices Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::VoicesResponse;
use crate::infrastructure::http::state::AppState;

/// GET /v1/audio/voices
///
/// 列出说话人样本目录中的可用音色名（不含扩展名），并附带
/// 数字索引兼容模式的开关状态
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.speakers.sample_names(),
        index_lookup: state.index_lookup,
    })
}
