//! Models Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::ModelList;
use crate::infrastructure::http::state::AppState;

/// GET /v1/models
///
/// 列出注册表中所有可用模型（启动时已全部加载）
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    Json(ModelList::new(state.registry.model_names()))
}
