//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::AudioFormat;

/// 应用主配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 模型清单配置
    #[serde(default)]
    pub models: ModelsConfig,

    /// 说话人样本配置
    #[serde(default)]
    pub speakers: SpeakersConfig,

    /// 合成引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 音频输出配置
    #[serde(default)]
    pub audio: AudioSettings,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 模型清单配置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// 模型清单文件路径（JSON 数组: {model_name, default_voice}）
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// 默认模型名；不在清单内时会被追加注册
    #[serde(default)]
    pub default_model: Option<String>,

    /// 进程级默认音色（音色回退链的最后一环，
    /// 同时作为追加注册的默认模型的默认音色）
    #[serde(default = "default_voice")]
    pub default_voice: String,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("tts_models.json")
}

fn default_voice() -> String {
    "Craig Gutsy".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            default_model: None,
            default_voice: default_voice(),
        }
    }
}

/// 说话人样本配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakersConfig {
    /// 参考音频样本目录（平坦命名空间，文件名即说话人标识）
    #[serde(default = "default_speakers_dir")]
    pub dir: PathBuf,

    /// 数字索引解析兼容模式（voice="0" 视为字典序第 0 个 .wav）
    #[serde(default)]
    pub index_lookup: bool,
}

fn default_speakers_dir() -> PathBuf {
    PathBuf::from("speakers")
}

impl Default for SpeakersConfig {
    fn default() -> Self {
        Self {
            dir: default_speakers_dir(),
            index_lookup: false,
        }
    }
}

/// 合成引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// 引擎服务基础 URL
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 请求超时时间（秒）；合成是长耗时调用
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
}

fn default_engine_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_engine_timeout() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            timeout_secs: default_engine_timeout(),
        }
    }
}

/// 音频输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    /// 临时波形目录（每请求一个 UUID 命名的 WAV，用后即删）
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// 未指定 response_format 时的输出格式
    #[serde(default)]
    pub default_format: AudioFormat,

    /// 有损格式目标比特率（bps）
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("data/scratch")
}

fn default_bitrate() -> u32 {
    64000
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            default_format: AudioFormat::Mp3,
            bitrate: default_bitrate(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.models.manifest_path, PathBuf::from("tts_models.json"));
        assert_eq!(config.models.default_voice, "Craig Gutsy");
        assert_eq!(config.audio.default_format, AudioFormat::Mp3);
        assert!(!config.speakers.index_lookup);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }
}
