// src/error.rs
use thiserror::Error;

/// Message shown to the user for every failed classification.
pub const USER_FAILURE_MESSAGE: &str = "Analysis failed. Please try again with a clearer photo.";

/// Everything that can go wrong between picking an image and holding a result.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no API key configured (set GEMINI_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("request to model service failed: {0}")]
    Transport(String),

    #[error("model service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model service returned no text")]
    EmptyResponse,

    #[error("failed to parse AI response: {0}")]
    Unparseable(#[from] serde_json::Error),

    #[error("image data is empty")]
    EmptyImage,

    #[error("invalid image input: {0}")]
    InvalidImage(String),

    #[error("a classification is already in progress")]
    Busy,

    #[error("the previous result must be cleared before classifying again")]
    NotReset,
}

impl ClassifyError {
    /// The outbound call itself failed (network, credential, quota).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClassifyError::MissingApiKey | ClassifyError::Transport(_) | ClassifyError::Api { .. }
        )
    }

    /// The call went through but the reply did not satisfy the result contract.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClassifyError::EmptyResponse | ClassifyError::Unparseable(_))
    }

    /// Flattened, user-facing form. Transport and validation failures read the same.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClassifyError::Busy => "A photo is already being analyzed.",
            ClassifyError::NotReset => "Start over before analyzing another photo.",
            _ => USER_FAILURE_MESSAGE,
        }
    }
}

impl From<reqwest::Error> for ClassifyError {
    fn from(e: reqwest::Error) -> Self {
        ClassifyError::Transport(e.to_string())
    }
}
