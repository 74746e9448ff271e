//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXGATE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXGATE_SERVER__PORT=8000`
/// - `VOXGATE_MODELS__MANIFEST_PATH=/etc/voxgate/tts_models.json`
/// - `VOXGATE_MODELS__DEFAULT_VOICE="Craig Gutsy"`
/// - `VOXGATE_ENGINE__URL=http://engine:9000`
/// - `VOXGATE_SPEAKERS__INDEX_LOOKUP=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("models.manifest_path", "tts_models.json")?
        .set_default("models.default_voice", "Craig Gutsy")?
        .set_default("speakers.dir", "speakers")?
        .set_default("speakers.index_lookup", false)?
        .set_default("engine.url", "http://localhost:9000")?
        .set_default("engine.timeout_secs", 120)?
        .set_default("audio.scratch_dir", "data/scratch")?
        .set_default("audio.default_format", "mp3")?
        .set_default("audio.bitrate", 64000)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: VOXGATE_
    // 层级分隔符: __ (双下划线)
    // 例如: VOXGATE_ENGINE__URL=http://engine:9000
    builder = builder.add_source(
        Environment::with_prefix("VOXGATE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证端口范围
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // 验证模型清单路径
    if config.models.manifest_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model manifest path cannot be empty".to_string(),
        ));
    }

    // 验证进程级默认音色
    if config.models.default_voice.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Default voice cannot be empty".to_string(),
        ));
    }

    // 验证引擎 URL
    if config.engine.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Engine URL cannot be empty".to_string(),
        ));
    }

    // 验证比特率
    if config.audio.bitrate == 0 {
        return Err(ConfigError::ValidationError(
            "Audio bitrate cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Model Manifest: {}", config.models.manifest_path.display());
    if let Some(default_model) = &config.models.default_model {
        tracing::info!("Default Model: {}", default_model);
    }
    tracing::info!("Default Voice: {}", config.models.default_voice);
    tracing::info!("Speakers Directory: {}", config.speakers.dir.display());
    tracing::info!("Index Lookup: {}", config.speakers.index_lookup);
    tracing::info!("Engine URL: {}", config.engine.url);
    tracing::info!("Engine Timeout: {}s", config.engine.timeout_secs);
    tracing::info!("Scratch Directory: {}", config.audio.scratch_dir.display());
    tracing::info!("Default Format: {}", config.audio.default_format);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
