// src/ai/mock.rs
//! Scripted connector for tests.

use std::sync::Mutex;

use serde_json::json;

use super::connector::{AiConnector, ModelRequest};
use crate::error::ClassifyError;

type Reply = Box<dyn Fn() -> Result<String, ClassifyError> + Send + Sync>;

pub struct MockConnector {
    reply: Reply,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockConnector {
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with(move || Ok(text.clone()))
    }

    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> ClassifyError + Send + Sync + 'static,
    {
        Self::with(move || Err(make_error()))
    }

    fn with<F>(reply: F) -> Self
    where
        F: Fn() -> Result<String, ClassifyError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn analysis_json(category: &str, item: &str) -> String {
        json!({
            "category": category,
            "binNameEn": "Bin",
            "binNameUr": "ڈبہ",
            "explanationEn": "Explanation",
            "explanationUr": "وضاحت",
            "identifiedItem": item
        })
        .to_string()
    }
}

impl AiConnector for MockConnector {
    fn generate(&self, request: &ModelRequest) -> Result<String, ClassifyError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.reply)()
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
