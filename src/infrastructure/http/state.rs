//! Application State

use std::sync::Arc;

use crate::application::{ModelRegistry, SpeechHandler};
use crate::infrastructure::adapters::speakers::DirSpeakerLookup;

/// 应用状态
pub struct AppState {
    /// 合成请求处理器
    pub speech_handler: SpeechHandler,
    /// 模型注册表（/v1/models 列表）
    pub registry: Arc<ModelRegistry>,
    /// 说话人样本目录（/v1/audio/voices 列表）
    pub speakers: Arc<DirSpeakerLookup>,
    /// 数字索引兼容模式开关（随音色列表一起暴露给客户端）
    pub index_lookup: bool,
}

impl AppState {
    pub fn new(
        speech_handler: SpeechHandler,
        registry: Arc<ModelRegistry>,
        speakers: Arc<DirSpeakerLookup>,
        index_lookup: bool,
    ) -> Self {
        Self {
            speech_handler,
            registry,
            speakers,
            index_lookup,
        }
    }
}
