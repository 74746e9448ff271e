//! Domain Layer - 领域值对象

pub mod speaker;

pub use speaker::SpeakerReference;
