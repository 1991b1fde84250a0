//! Gemini API client

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::prompts;
use crate::ai::tips::TipProvider;
use crate::core::config::{Config, GeminiModel};
use crate::core::credentials::CredentialStore;
use crate::error::{EduQuestError, Result};

/// Gemini API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    model: GeminiModel,
    tip_max_chars: u32,
}

impl GeminiClient {
    /// Create a client from the stored API key and configuration
    pub fn new() -> Result<Self> {
        let api_key = CredentialStore::require_gemini_key()?;
        let config = Config::load()?;
        Ok(Self::with_key(api_key, &config))
    }

    /// Create a client with an explicit key
    pub fn with_key(api_key: SecretString, config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: config.gemini_model,
            tip_max_chars: config.tip_max_chars,
        }
    }

    /// Get the current model name
    pub fn model_name(&self) -> &str {
        self.model.display_name()
    }

    /// Generate content using the Gemini API
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE,
            self.model.api_name(),
            self.api_key.expose_secret()
        );

        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: 0.9,
                max_output_tokens: max_tokens,
            }),
        };

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EduQuestError::GeminiApi(format!("Request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EduQuestError::GeminiApi(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EduQuestError::GeminiApi(format!("Failed to parse response: {}", e)))?;

        extract_text(gemini_response)
    }
}

#[async_trait]
impl TipProvider for GeminiClient {
    async fn tip(&self, subject: &str) -> Result<String> {
        let prompt = prompts::study_tip_prompt(subject, self.tip_max_chars);
        tracing::debug!(subject, model = self.model.api_name(), "requesting study tip");
        self.generate(&prompt, 256).await
    }
}

/// Provider used when no API key is configured: always fails, so callers
/// fall back to the built-in tip.
pub struct UnconfiguredProvider;

#[async_trait]
impl TipProvider for UnconfiguredProvider {
    async fn tip(&self, _subject: &str) -> Result<String> {
        Err(EduQuestError::GeminiNotConfigured)
    }
}

/// Build the tip provider for this run
pub fn tip_provider() -> Arc<dyn TipProvider> {
    match GeminiClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::info!(error = %e, "study tips disabled");
            Arc::new(UnconfiguredProvider)
        }
    }
}

/// Pull the first text part out of a response
fn extract_text(response: GeminiResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| EduQuestError::GeminiApi("Empty response from API".to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
