//! Request Normalizer - OpenAI 请求体规范化
//!
//! 把 OpenAI 风格的原始请求字段映射为规范化的合成输入元组
//! (model, text, language, voice, format)。
//!
//! 字段映射约定（历史上 `instructions` 在不同兼容变体中含义不一，
//! 这里取唯一的规范映射）：
//! - `input`: 待合成文本，必填且非空
//! - `language`: 语言代码；缺省时接受 `instructions` 作为别名，再缺省为 "en"
//! - `voice`: 音色，回退链 请求字段 > 模型默认音色 > 进程级默认音色
//! - `response_format`: mp3 / wav / opus，默认 mp3

use std::str::FromStr;
use std::sync::Arc;

use super::error::ApplicationError;
use super::ports::AudioFormat;
use super::registry::ModelRegistry;
use super::speech::SpeechCommand;

/// 规范化后的合成输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSpeech {
    /// 已注册的模型名称
    pub model_name: String,
    /// 待合成文本
    pub text: String,
    /// 语言代码；非多语模型固定为 None
    pub language: Option<String>,
    /// 待解析的音色字符串
    pub voice: String,
    /// 响应格式
    pub format: AudioFormat,
}

/// 请求规范化器
pub struct RequestNormalizer {
    registry: Arc<ModelRegistry>,
    /// 进程级默认音色（回退链最后一环）
    fallback_voice: String,
    /// 未指定 response_format 时的格式
    default_format: AudioFormat,
}

impl RequestNormalizer {
    pub fn new(
        registry: Arc<ModelRegistry>,
        fallback_voice: impl Into<String>,
        default_format: AudioFormat,
    ) -> Self {
        Self {
            registry,
            fallback_voice: fallback_voice.into(),
            default_format,
        }
    }

    /// 规范化一次合成请求
    pub fn normalize(&self, command: &SpeechCommand) -> Result<NormalizedSpeech, ApplicationError> {
        // 1. 模型选择：显式字段优先，缺省回退到配置的默认模型
        let model_name = match non_empty(command.model.as_deref()) {
            Some(requested) => {
                if !self.registry.contains(requested) {
                    return Err(ApplicationError::ModelNotAvailable {
                        requested: requested.to_string(),
                        available: self.registry.model_names(),
                    });
                }
                requested.to_string()
            }
            None => self
                .registry
                .default_model()
                .map(String::from)
                .ok_or(ApplicationError::MissingField("model"))?,
        };
        let entry = self
            .registry
            .get(&model_name)
            .ok_or_else(|| ApplicationError::Internal(format!("registry lost model '{}'", model_name)))?;

        // 2. 文本：严格策略，input 必填且非空
        let text = non_empty(command.input.as_deref())
            .ok_or(ApplicationError::MissingField("input"))?
            .to_string();

        // 3. 音色回退链，惰性求值，取首个非空值
        let voice = [
            command.voice.as_deref(),
            entry.default_voice.as_deref(),
            Some(self.fallback_voice.as_str()),
        ]
        .into_iter()
        .flatten()
        .find_map(|candidate| non_empty(Some(candidate)))
        .ok_or(ApplicationError::MissingField("voice"))?
        .to_string();

        // 4. 语言：language > instructions 别名 > "en"；非多语模型强制 None
        let language = if entry.multilingual {
            let lang = non_empty(command.language.as_deref())
                .or_else(|| non_empty(command.instructions.as_deref()))
                .unwrap_or("en");
            Some(lang.to_string())
        } else {
            None
        };

        // 5. 响应格式
        let format = match non_empty(command.response_format.as_deref()) {
            Some(raw) => AudioFormat::from_str(raw)
                .map_err(|_| ApplicationError::UnsupportedFormat(raw.to_string()))?,
            None => self.default_format,
        };

        Ok(NormalizedSpeech {
            model_name,
            text,
            language,
            voice,
            format,
        })
    }
}

/// 去除首尾空白后非空的字符串
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
