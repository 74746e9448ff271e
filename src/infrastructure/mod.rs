//! Infrastructure Layer - 适配器与 HTTP 入口

pub mod adapters;
pub mod http;
