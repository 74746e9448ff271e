//! 应用层错误定义
//!
//! 合成请求生命周期内的统一错误类型

use thiserror::Error;

use super::ports::{SynthesisError, TranscodeError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求体缺少必填字段或字段为空
    #[error("Missing or empty '{0}' field in request body")]
    MissingField(&'static str),

    /// 请求的模型未注册
    #[error("Requested model '{requested}' is not available. Available models: {}", available.join(", "))]
    ModelNotAvailable {
        requested: String,
        available: Vec<String>,
    },

    /// 不支持的响应格式
    #[error("Unsupported response_format '{0}', expected one of: mp3, wav, opus")]
    UnsupportedFormat(String),

    /// 说话人解析失败（既无文件匹配也无有效名称）
    #[error("No speaker reference available for voice '{0}'")]
    SpeakerResolution(String),

    /// 合成引擎错误
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// 转码错误
    #[error("Transcode failed: {0}")]
    Transcode(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// 出错的请求字段（用于 OpenAI 风格错误响应的 param）
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) => Some(field),
            Self::ModelNotAvailable { .. } => Some("model"),
            Self::UnsupportedFormat(_) => Some("response_format"),
            Self::SpeakerResolution(_) => Some("voice"),
            _ => None,
        }
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        Self::Synthesis(err.to_string())
    }
}

impl From<TranscodeError> for ApplicationError {
    fn from(err: TranscodeError) -> Self {
        Self::Transcode(err.to_string())
    }
}
