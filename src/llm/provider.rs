// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// HTTP completion providers (OpenAI chat completions, Anthropic messages)

use crate::config::{Config, ProviderKind};
use crate::engine_core::constants::provider as defaults;
use crate::engine_core::errors::ClassifierError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One system + user exchange with a chat model, returning the raw reply text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, system: &str, user: &str) -> Result<String, ClassifierError>;
}

/// Sampling parameters shared by both providers
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, ClassifierError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| {
            ClassifierError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
        })
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Turn a non-success response into the matching error; 429 becomes `RateLimited`.
async fn error_from_response(provider: &'static str, response: reqwest::Response) -> ClassifierError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body.trim()));

    if status.as_u16() == defaults::RATE_LIMIT_STATUS {
        warn!(provider, "Upstream rate limit");
        ClassifierError::RateLimited {
            provider: provider.to_string(),
            message,
        }
    } else {
        warn!(provider, status = status.as_u16(), error = %message, "Upstream error");
        ClassifierError::ProviderError {
            provider: provider.to_string(),
            message,
        }
    }
}

fn transport_error(provider: &'static str, e: reqwest::Error) -> ClassifierError {
    if e.is_timeout() {
        ClassifierError::TransportError(format!("{} request timed out", provider))
    } else {
        ClassifierError::TransportError(format!("{}: {}", provider, e))
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

pub struct OpenAiProvider {
    http_client: Client,
    api_key: String,
    endpoint: String,
    settings: CompletionSettings,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, settings: CompletionSettings) -> Result<Self, ClassifierError> {
        Ok(Self {
            http_client: build_client(settings.timeout)?,
            api_key: api_key.into(),
            endpoint: defaults::OPENAI_CHAT_URL.to_string(),
            settings,
        })
    }

    /// Point at a compatible gateway instead of the public API
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ClassifierError> {
        let request = OpenAiRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(provider = self.name(), model = %self.settings.model, "Sending completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: OpenAiResponse = response.json().await.map_err(|e| {
            ClassifierError::ResponseFormatError(format!("unexpected OpenAI response: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::ResponseFormatError("OpenAI reply has no content".to_string()))
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicProvider {
    http_client: Client,
    api_key: String,
    endpoint: String,
    settings: CompletionSettings,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, settings: CompletionSettings) -> Result<Self, ClassifierError> {
        Ok(Self {
            http_client: build_client(settings.timeout)?,
            api_key: api_key.into(),
            endpoint: defaults::ANTHROPIC_MESSAGES_URL.to_string(),
            settings,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ClassifierError> {
        let request = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system,
            messages: vec![ChatMessage { role: "user", content: user }],
        };

        debug!(provider = self.name(), model = %self.settings.model, "Sending completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: AnthropicResponse = response.json().await.map_err(|e| {
            ClassifierError::ResponseFormatError(format!("unexpected Anthropic response: {}", e))
        })?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(ClassifierError::ResponseFormatError(
                "Anthropic reply has no text block".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Build the provider selected in `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn CompletionProvider>, ClassifierError> {
    let settings = CompletionSettings::from_config(config);
    let key = config.api_key()?;
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(key, settings)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(key, settings)?),
    };
    Ok(provider)
}
