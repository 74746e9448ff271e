//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod speaker_lookup;
mod synthesizer;
mod transcoder;

pub use speaker_lookup::SpeakerLookupPort;
pub use synthesizer::{SynthesisError, SynthesisOutput, SynthesisRequest, SynthesizerPort};
pub use transcoder::{
    AudioFormat, AudioInfo, TranscodeConfig, TranscodeError, TranscodeResult, TranscoderPort,
};
