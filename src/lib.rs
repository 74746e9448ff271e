//! Voxgate - OpenAI 兼容 TTS 网关服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - SpeakerReference: 说话人引用值对象（参考音频文件 / 内置说话人名称）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SynthesizerPort, SpeakerLookupPort, TranscoderPort）
//! - ModelRegistry: 启动时加载的只读模型注册表
//! - RequestNormalizer: OpenAI 请求体 → 规范化合成输入
//! - SpeakerResolver: voice 字符串 → SpeakerReference 优先级解析
//! - SpeechHandler: 合成请求编排（解析 → 合成 → 转码 → 清理）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: /v1/audio/speech 等 RESTful API
//! - Adapters: 合成引擎客户端、说话人样本目录查找、音频转码器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
