// ABOUTME: OpenAI-compatible chat completions client used as the plan generation service
// ABOUTME: Works with the hosted OpenAI API and local Ollama, vLLM, or LocalAI servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! ## Configuration
//!
//! - `NUTRIPLAN_LLM_PROVIDER`: `openai` (default), `ollama`, `vllm`, or `localai`
//! - `NUTRIPLAN_LLM_BASE_URL`: Base URL (default depends on the provider)
//! - `NUTRIPLAN_LLM_MODEL`: Model to use (default: `gpt-4o-mini`)
//! - `NUTRIPLAN_LLM_API_KEY`: API key (optional for local servers)
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutriplan::llm::{ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleProvider};
//! use nutriplan::errors::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let provider = OpenAiCompatibleProvider::from_env()?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("Suggest a high protein breakfast")]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use crate::config::LlmProviderType;
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable for the base URL
const BASE_URL_ENV: &str = "NUTRIPLAN_LLM_BASE_URL";

/// Environment variable for the model
const MODEL_ENV: &str = "NUTRIPLAN_LLM_MODEL";

/// Environment variable for the API key (optional)
const API_KEY_ENV: &str = "NUTRIPLAN_LLM_API_KEY";

/// Default model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Transport-level request timeout; the generation client applies its own, shorter deadline
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Service label used in error messages
const SERVICE: &str = "GenerationService";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Backend kind, used for naming and defaults
    pub provider: LlmProviderType,
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Configuration for a backend at its default URL
    ///
    /// The hosted API and vLLM honour `response_format`; Ollama and `LocalAI`
    /// are treated as text-only and rely on the prompt to get JSON.
    #[must_use]
    pub fn for_provider(provider: LlmProviderType, model: &str) -> Self {
        let capabilities = match provider {
            LlmProviderType::OpenAi | LlmProviderType::Vllm => LlmCapabilities::structured(),
            LlmProviderType::Ollama | LlmProviderType::LocalAi => LlmCapabilities::text_only(),
        };
        Self {
            provider,
            base_url: provider.default_base_url().to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            capabilities,
        }
    }

    /// Create configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self::for_provider(LlmProviderType::Ollama, model)
    }

    /// Create configuration for a local vLLM instance
    #[must_use]
    pub fn vllm(model: &str) -> Self {
        Self::for_provider(LlmProviderType::Vllm, model)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self::for_provider(LlmProviderType::OpenAi, DEFAULT_MODEL)
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI`-compatible chat completions provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created, or the hosted
    /// provider is selected without `NUTRIPLAN_LLM_API_KEY`.
    pub fn from_env() -> Result<Self, AppError> {
        let provider = LlmProviderType::from_env();
        let model = env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let mut config = OpenAiCompatibleConfig::for_provider(provider, &model);
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        config.api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());

        if provider == LlmProviderType::OpenAi && config.api_key.is_none() {
            return Err(AppError::config(format!(
                "{API_KEY_ENV} is required for the {provider} provider"
            )));
        }

        info!(
            "Initializing {} provider: base_url={}, model={}",
            provider.display_name(),
            config.base_url,
            config.default_model
        );

        Self::new(config)
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &OpenAiCompatibleConfig {
        &self.config
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Build the wire request, asking for JSON output only when supported
    fn build_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
            .to_owned();
        let response_format = (request.json_mode && self.config.capabilities.supports_json_mode())
            .then_some(ResponseFormat {
                format_type: "json_object",
            });

        OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            response_format,
        }
    }

    /// Map a transport error to the engine error taxonomy
    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        if e.is_connect() {
            AppError::external_unavailable(
                SERVICE,
                format!(
                    "Cannot connect to {}. Is the server running at {}?",
                    self.config.provider.display_name(),
                    self.config.base_url
                ),
            )
        } else if e.is_timeout() {
            AppError::external_unavailable(SERVICE, format!("Request timed out: {e}"))
        } else {
            AppError::external_service(SERVICE, format!("Failed to send request: {e}"))
        }
    }

    /// Parse error response from API
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 | 403 => AppError::auth_invalid(format!(
                    "API authentication failed: {}",
                    error_response.error.message
                )),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(&error_response.error.message),
                ),
                400 => AppError::invalid_input(format!(
                    "API validation error: {}",
                    error_response.error.message
                )),
                404 => AppError::not_found(format!(
                    "Model or endpoint ({})",
                    error_response.error.message
                )),
                500..=599 => AppError::external_unavailable(
                    SERVICE,
                    format!("Service error: {}", error_response.error.message),
                ),
                _ => AppError::external_service(
                    SERVICE,
                    format!("{} - {}", error_type, error_response.error.message),
                ),
            }
        } else {
            match status.as_u16() {
                502..=504 => AppError::external_unavailable(
                    SERVICE,
                    "Generation server is not responding".to_owned(),
                ),
                _ => AppError::external_service(
                    SERVICE,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Extract a user-friendly rate limit message
    fn extract_rate_limit_message(message: &str) -> String {
        let lower = message.to_lowercase();
        if let Some(retry_pos) = lower.find("try again in ") {
            let after_prefix = &lower[retry_pos + "try again in ".len()..];
            let end_pos = after_prefix
                .find(|c: char| !c.is_ascii_digit() && c != '.')
                .unwrap_or(after_prefix.len());
            if let Ok(seconds) = after_prefix[..end_pos].parse::<f64>() {
                let seconds_int = seconds.ceil() as u64;
                return format!(
                    "Generation rate limit reached. Please try again in {seconds_int} seconds."
                );
            }
        }
        "Generation rate limit reached. Please wait a moment and try again.".to_owned()
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        match self.config.provider {
            LlmProviderType::OpenAi => "openai",
            LlmProviderType::Ollama => "ollama",
            LlmProviderType::Vllm => "vllm",
            LlmProviderType::LocalAi => "localai",
        }
    }

    fn display_name(&self) -> &'static str {
        self.config.provider.display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let openai_request = self.build_request(request);
        debug!(
            "Sending chat completion request to {} with {} messages, json_mode={}",
            self.name(),
            openai_request.messages.len(),
            openai_request.response_format.is_some()
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {}: {}", self.name(), e);
                self.transport_error(&e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            AppError::new(
                ErrorCode::ExternalResponseInvalid,
                format!("{SERVICE}: failed to parse response envelope: {e}"),
            )
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {}: {} chars, finish_reason: {:?}",
            self.name(),
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model,
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        debug!(
            "Performing {} health check at {}",
            self.name(),
            self.config.base_url
        );

        let http_request = self.client.get(self.api_url("models"));
        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("{} health check failed: {}", self.name(), e);
                self.transport_error(&e)
            })?;

        let healthy = response.status().is_success();
        if healthy {
            debug!("{} health check passed", self.name());
        } else {
            warn!(
                "{} health check failed with status: {}",
                self.name(),
                response.status()
            );
        }

        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_extracts_seconds() {
        let message = OpenAiCompatibleProvider::extract_rate_limit_message(
            "Rate limit reached. Please try again in 7.2s.",
        );
        assert!(message.contains("8 seconds"));
    }

    #[test]
    fn test_error_mapping() {
        let unavailable = OpenAiCompatibleProvider::parse_error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "<html>down</html>",
        );
        assert_eq!(unavailable.code, ErrorCode::ExternalServiceUnavailable);

        let auth = OpenAiCompatibleProvider::parse_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#,
        );
        assert_eq!(auth.code, ErrorCode::ExternalAuthFailed);
    }

    #[test]
    fn test_json_mode_only_when_supported() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_json_mode();

        let hosted = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::default()).unwrap();
        assert!(hosted.build_request(&request).response_format.is_some());

        let ollama =
            OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::ollama("llama3.1")).unwrap();
        assert!(ollama.build_request(&request).response_format.is_none());
    }
}
