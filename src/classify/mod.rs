// src/classify/mod.rs
//! Request building, submission and reply validation for one classification.

pub mod prompt;
pub mod types;
pub mod validator;

use log::{error, info};

use crate::ai::{AiConnector, ModelRequest};
use crate::capture::EncodedImage;
use crate::error::ClassifyError;

pub use types::{BinCategory, WasteAnalysis};
pub use validator::parse_analysis;

/// Wrap an encoded image with the fixed policy and output schema.
pub fn build_request(image: EncodedImage) -> ModelRequest {
    ModelRequest {
        image,
        prompt: prompt::USER_PROMPT.to_string(),
        system_instruction: prompt::SYSTEM_INSTRUCTION.to_string(),
        response_schema: prompt::response_schema(),
    }
}

/// Submit one image and validate the reply. Exactly one call, no retry.
pub fn classify(connector: &dyn AiConnector, image: EncodedImage) -> Result<WasteAnalysis, ClassifyError> {
    let request = build_request(image);
    let outcome = connector
        .generate(&request)
        .and_then(|text| parse_analysis(&text));

    match &outcome {
        Ok(analysis) => {
            info!("Classified '{}' as {}", analysis.identified_item, analysis.category)
        }
        Err(e) if e.is_transport() => {
            error!("Model call to {} failed: {}", connector.model_name(), e)
        }
        Err(e) if e.is_validation() => error!("Model reply rejected: {}", e),
        Err(e) => error!("Classification failed: {}", e),
    }
    outcome
}
