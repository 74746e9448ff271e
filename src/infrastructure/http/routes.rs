//! HTTP Routes
//!
//! API Endpoints:
//! - /v1/audio/speech   POST  语音合成（OpenAI 兼容）
//! - /v1/models         GET   列出可用模型（OpenAI 兼容）
//! - /v1/audio/voices   GET   列出可用音色
//! - /api/ping          GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/audio/speech", post(handlers::create_speech))
        .route("/v1/models", get(handlers::list_models))
        .route("/v1/audio/voices", get(handlers::list_voices))
        .route("/api/ping", get(handlers::ping))
}
