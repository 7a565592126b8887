// src/ai/gemini.rs
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::connector::{AiConnector, ModelRequest};
use crate::config::Settings;
use crate::error::ClassifyError;

const API_KEY_HEADER: &str = "x-goog-api-key";

//Implementation for Google Gemini generateContent over REST
pub struct GeminiModel {
    endpoint: String,
    model_name: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    InlineData(InlineData<'a>),
    Text(&'a str),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// A model as listed by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods.iter().any(|m| m == "generateContent")
    }

    /// Name without the `models/` resource prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

impl GeminiModel {
    pub fn new(settings: &Settings) -> Result<Self, ClassifyError> {
        info!("Initializing Gemini model: {} at {}", settings.model, settings.endpoint);

        if settings.api_key.is_none() {
            warn!("Gemini model created without an API key");
        }

        let client = Client::builder()
            .user_agent(concat!("ecosort/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model_name: settings.model.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    fn api_key(&self) -> Result<&str, ClassifyError> {
        self.api_key.as_deref().ok_or(ClassifyError::MissingApiKey)
    }

    //Check that the configured model exists and the key is accepted
    pub fn check_model(&self) -> Result<ModelInfo, ClassifyError> {
        let url = format!("{}/models/{}", self.endpoint, self.model_name);
        let response = self.client.get(&url).header(API_KEY_HEADER, self.api_key()?).send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    //List every model that can serve generateContent
    pub fn list_models(&self) -> Result<Vec<ModelInfo>, ClassifyError> {
        let url = format!("{}/models", self.endpoint);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).header(API_KEY_HEADER, self.api_key()?);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = request.send()?;

            let status = response.status();
            let body = response.text()?;
            if !status.is_success() {
                return Err(api_error(status.as_u16(), &body));
            }

            let page: ModelList = serde_json::from_str(&body)?;
            models.extend(page.models.into_iter().filter(ModelInfo::supports_generate_content));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

impl AiConnector for GeminiModel {
    fn generate(&self, request: &ModelRequest) -> Result<String, ClassifyError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model_name);
        let body = build_request_body(request);

        info!(
            "Sending {} image ({} bytes) to {}",
            request.image.mime_type,
            request.image.byte_len(),
            self.model_name
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Transport("request timed out".to_string())
                } else {
                    ClassifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        extract_text(&text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn build_request_body(request: &ModelRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::InlineData(InlineData {
                    mime_type: &request.image.mime_type,
                    data: &request.image.data,
                }),
                Part::Text(&request.prompt),
            ],
        }],
        system_instruction: SystemInstruction {
            parts: vec![Part::Text(&request.system_instruction)],
        },
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, ClassifyError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    let candidate = response.candidates.into_iter().next().ok_or(ClassifyError::EmptyResponse)?;
    if let Some(reason) = &candidate.finish_reason {
        debug!("Candidate finished with {}", reason);
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }
    Ok(text)
}

fn api_error(status: u16, body: &str) -> ClassifyError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ClassifyError::Api { status, message }
}
