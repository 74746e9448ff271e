//! Synthesizer Adapters - 合成引擎客户端

mod fake_engine;
mod http_engine;

pub use fake_engine::{FakeEngine, FakeEngineConfig};
pub use http_engine::{HttpEngineClient, HttpEngineConfig};
