//! Application Layer - 用例编排
//!
//! - ports: 出站端口（合成引擎、样本查找、转码器）
//! - registry: 只读模型注册表
//! - normalizer: OpenAI 请求体规范化
//! - resolver: 音色字符串 → SpeakerReference
//! - speech: 合成请求处理器

pub mod error;
pub mod normalizer;
pub mod ports;
pub mod registry;
pub mod resolver;
pub mod speech;

pub use error::ApplicationError;
pub use normalizer::{NormalizedSpeech, RequestNormalizer};
pub use registry::{ModelEntry, ModelRegistry};
pub use resolver::SpeakerResolver;
pub use speech::{SpeechCommand, SpeechHandler, SpeechOutput};
