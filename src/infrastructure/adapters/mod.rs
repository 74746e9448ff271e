//! Infrastructure Adapters - 出站端口实现

pub mod speakers;
pub mod synthesizer;
pub mod transcoder;
