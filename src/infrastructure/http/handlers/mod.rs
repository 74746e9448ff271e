//! HTTP Handlers

mod models;
mod ping;
mod speech;
mod voices;

pub use models::*;
pub use ping::*;
pub use speech::*;
pub use voices::*;
