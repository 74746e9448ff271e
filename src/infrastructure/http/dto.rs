//! HTTP DTOs
//!
//! OpenAI 兼容的请求/响应结构

use serde::{Deserialize, Serialize};

use crate::application::SpeechCommand;

/// POST /v1/audio/speech 请求体
///
/// 所有字段在反序列化层都是可选的，缺失校验在应用层统一处理
#[derive(Debug, Default, Deserialize)]
pub struct CreateSpeechRequest {
    pub model: Option<String>,
    pub input: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub instructions: Option<String>,
    pub response_format: Option<String>,
}

impl From<CreateSpeechRequest> for SpeechCommand {
    fn from(req: CreateSpeechRequest) -> Self {
        SpeechCommand {
            model: req.model,
            input: req.input,
            voice: req.voice,
            language: req.language,
            instructions: req.instructions,
            response_format: req.response_format,
        }
    }
}

/// GET /v1/models 响应中的单个模型
#[derive(Debug, Serialize)]
pub struct ModelObject {
    pub id: String,
    pub object: &'static str,
    pub owned_by: &'static str,
}

impl ModelObject {
    pub fn new(id: String) -> Self {
        Self {
            id,
            object: "model",
            owned_by: "voxgate",
        }
    }
}

/// GET /v1/models 响应
#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelObject>,
}

impl ModelList {
    pub fn new(model_names: Vec<String>) -> Self {
        Self {
            object: "list",
            data: model_names.into_iter().map(ModelObject::new).collect(),
        }
    }
}

/// GET /v1/audio/voices 响应
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<String>,
    /// 数字索引兼容模式是否开启（voice="0" 会被解释为索引）
    pub index_lookup: bool,
}
