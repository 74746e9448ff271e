//! Transcoder Port - 音频转码抽象
//!
//! 定义把引擎输出的 WAV 波形转换为响应格式（mp3/opus/wav）的抽象接口

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 转码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 格式 - OpenAI 默认
    #[default]
    Mp3,
    /// 原始 WAV
    Wav,
    /// Opus（OGG 容器）
    Opus,
}

impl AudioFormat {
    /// HTTP 响应的 Content-Type
    ///
    /// mp3 按惯例映射为 audio/mpeg，其余为 audio/<format>
    pub fn media_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/opus",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Mp3 => write!(f, "mp3"),
            AudioFormat::Wav => write!(f, "wav"),
            AudioFormat::Opus => write!(f, "opus"),
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            "opus" => Ok(AudioFormat::Opus),
            _ => Err(TranscodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 转码配置
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// 输出格式
    pub format: AudioFormat,
    /// 目标比特率（bps），用于有损格式
    pub bitrate: Option<u32>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            bitrate: Some(64000),
        }
    }
}

/// 转码结果
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    /// 转码后的音频数据
    pub audio_data: Vec<u8>,
    /// 输出格式
    pub format: AudioFormat,
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

/// 音频信息
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
    /// 位深度
    pub bits_per_sample: u16,
    /// PCM 数据大小（字节）
    pub data_size: usize,
}

/// Transcoder Port
///
/// 音频转码的抽象接口
#[async_trait]
pub trait TranscoderPort: Send + Sync {
    /// 转码 WAV 音频为目标格式
    async fn transcode(
        &self,
        wav_data: &[u8],
        config: &TranscodeConfig,
    ) -> Result<TranscodeResult, TranscodeError>;

    /// 获取音频信息（不转码）
    fn audio_info(&self, wav_data: &[u8]) -> Result<AudioInfo, TranscodeError>;

    /// 检查是否支持指定格式
    fn supports_format(&self, format: AudioFormat) -> bool;
}
