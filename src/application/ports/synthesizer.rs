//! Synthesizer Port - 合成引擎抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层。
//! 合成调用是长耗时阻塞操作，本层不做重试和取消。

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model load failed for '{model}': {message}")]
    ModelLoad { model: String, message: String },
}

/// 合成请求
///
/// 不变量: `speaker_wav` 与 `speaker_name` 恰好一个为 Some
/// （由 SpeakerResolver 保证，适配器再做防御性校验）
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 目标模型名称（必须已通过 load_model 就绪）
    pub model_name: String,
    /// 要合成的文本
    pub text: String,
    /// 语言代码；非多语模型为 None
    pub language: Option<String>,
    /// 参考音频路径（声音克隆）
    pub speaker_wav: Option<PathBuf>,
    /// 模型内置说话人名称
    pub speaker_name: Option<String>,
    /// 合成波形的落盘路径（WAV）
    pub output_path: PathBuf,
}

impl SynthesisRequest {
    /// 校验说话人参数恰好一个非空
    pub fn validate_speaker(&self) -> Result<(), SynthesisError> {
        match (&self.speaker_wav, &self.speaker_name) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (None, None) => Err(SynthesisError::InvalidInput(
                "no speaker reference available".to_string(),
            )),
            (Some(_), Some(_)) => Err(SynthesisError::InvalidInput(
                "both speaker_wav and speaker_name set".to_string(),
            )),
        }
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// 实际写入的波形文件路径
    pub output_path: PathBuf,
    /// 音频时长（毫秒），引擎未报告时为 None
    pub duration_ms: Option<u64>,
    /// 采样率
    pub sample_rate: Option<u32>,
}

/// Synthesizer Port
///
/// 外部合成引擎的抽象接口
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// 预加载指定模型
    ///
    /// 启动时对注册表中每个模型调用一次；失败视为致命错误，服务不对外
    async fn load_model(&self, model_name: &str) -> Result<(), SynthesisError>;

    /// 执行合成，将波形写入 `request.output_path`
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisOutput, SynthesisError>;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(wav: Option<&str>, name: Option<&str>) -> SynthesisRequest {
        SynthesisRequest {
            model_name: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            text: "Hello".to_string(),
            language: Some("en".to_string()),
            speaker_wav: wav.map(PathBuf::from),
            speaker_name: name.map(String::from),
            output_path: PathBuf::from("out.wav"),
        }
    }

    #[test]
    fn test_validate_speaker_exactly_one() {
        assert!(request(Some("a.wav"), None).validate_speaker().is_ok());
        assert!(request(None, Some("alice")).validate_speaker().is_ok());
        assert!(request(None, None).validate_speaker().is_err());
        assert!(request(Some("a.wav"), Some("alice")).validate_speaker().is_err());
    }
}
