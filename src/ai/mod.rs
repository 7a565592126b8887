// src/ai/mod.rs
pub mod connector;
pub mod gemini;
#[cfg(test)]
pub mod mock;

pub use connector::{AiConnector, ModelRequest};
pub use gemini::GeminiModel;
