// src/ai/connector.rs
use serde_json::Value;

use crate::capture::EncodedImage;
use crate::error::ClassifyError;

/// One multimodal generation call: an inline image, a text prompt, the system
/// instruction and the structured-output schema.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub image: EncodedImage,
    pub prompt: String,
    pub system_instruction: String,
    pub response_schema: Value,
}

/// Trait defining the interface for the hosted model
pub trait AiConnector: Send + Sync {
    /// Send one request and return the model's raw text reply
    fn generate(&self, request: &ModelRequest) -> Result<String, ClassifyError>;

    /// Name of the model behind this connector, for logs and reports
    fn model_name(&self) -> &str;
}
