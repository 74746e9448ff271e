//! Configuration - 配置加载与模型清单

mod loader;
mod manifest;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use manifest::{apply_default_model, load_manifest, ManifestEntry, ManifestError};
pub use types::{
    AppConfig, AudioSettings, EngineConfig, LogConfig, ModelsConfig, ServerConfig, SpeakersConfig,
};
