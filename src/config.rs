// src/config.rs
use log::warn;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the hosted model, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Settings {
    /// Command-line values win, then the environment, then built-in defaults.
    pub fn resolve(api_key: Option<String>, model: Option<String>, endpoint: Option<String>) -> Self {
        Self::resolve_with(api_key, model, endpoint, |name| std::env::var(name).ok())
    }

    fn resolve_with<F>(
        api_key: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .or_else(|| env("GEMINI_API_KEY"))
            .or_else(|| env("API_KEY"))
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("No API key found; classification requests will fail until one is provided");
        }

        let model = model
            .or_else(|| env("ECOSORT_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = endpoint
            .or_else(|| env("GEMINI_ENDPOINT"))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Self { api_key, model, endpoint }
    }
}

/// Path to a font file with Urdu glyphs for the desktop window.
pub fn urdu_font_path() -> Option<String> {
    std::env::var("ECOSORT_URDU_FONT").ok().filter(|p| !p.is_empty())
}
