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

use crate::engine_core::constants::config as keys;
use crate::engine_core::constants::{batch, provider, storage};
use crate::engine_core::errors::ClassifierError;
use crate::engine_core::taxonomy::TaxonomyVersion;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn parse_safe(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => ProviderKind::Anthropic,
            "openai" | "gpt" => ProviderKind::OpenAi,
            _ => ProviderKind::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub delay_ms: u64,
    pub max_attempts: u32,
    pub storage_dir: PathBuf,
    pub taxonomy_version: TaxonomyVersion,
    /// Run the stage-2 correction prompt after the first classification
    pub validation_stage: bool,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Optional YAML file named by `CLASSIFIER_CONFIG_PATH`, then the environment.
    pub fn load() -> Result<Self, ClassifierError> {
        let base = match env::var(keys::ENV_CONFIG_PATH) {
            Ok(path) => Self::from_yaml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = base.with_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::ConfigurationError(format!(
                "cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ClassifierError> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| ClassifierError::ConfigurationError(format!("invalid config YAML: {}", e)))
    }

    /// Overlay values found through `lookup` (the process environment in production).
    ///
    /// Unparsable numbers keep the previous value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(keys::ENV_PROVIDER) {
            self.provider = ProviderKind::parse_safe(&v);
        }
        if let Some(v) = lookup(keys::ENV_OPENAI_API_KEY) {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = lookup(keys::ENV_ANTHROPIC_API_KEY) {
            self.anthropic_api_key = Some(v);
        }
        if let Some(v) = lookup(keys::ENV_OPENAI_MODEL) {
            self.openai_model = v;
        }
        if let Some(v) = lookup(keys::ENV_ANTHROPIC_MODEL) {
            self.anthropic_model = v;
        }
        if let Some(v) = lookup(keys::ENV_DELAY_MS).and_then(|v| v.trim().parse().ok()) {
            self.delay_ms = v;
        }
        if let Some(v) = lookup(keys::ENV_MAX_ATTEMPTS).and_then(|v| v.trim().parse().ok()) {
            self.max_attempts = v;
        }
        if let Some(v) = lookup(keys::ENV_STORAGE_DIR) {
            self.storage_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(keys::ENV_TAXONOMY_VERSION) {
            self.taxonomy_version = TaxonomyVersion::parse_safe(&v);
        }
        if let Some(v) = lookup(keys::ENV_VALIDATION_STAGE) {
            self.validation_stage = parse_flag(&v);
        }
        if let Some(v) =
            lookup(keys::ENV_REQUEST_TIMEOUT_SECS).and_then(|v| v.trim().parse().ok())
        {
            self.request_timeout_secs = v;
        }
        if let Some(v) = lookup(keys::ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        if let Some(v) = lookup(keys::ENV_LOG_FORMAT) {
            self.log_format = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_attempts == 0 {
            return Err(ClassifierError::ConfigurationError(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClassifierError::ConfigurationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ClassifierError::ConfigurationError(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ClassifierError::ConfigurationError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.log_format.as_str(), "json" | "text") {
            return Err(ClassifierError::ConfigurationError(format!(
                "log_format must be 'json' or 'text', got '{}'",
                self.log_format
            )));
        }
        Ok(())
    }

    /// API key for the selected provider. Checked lazily so offline commands work without one.
    pub fn api_key(&self) -> Result<&str, ClassifierError> {
        let (key, var) = match self.provider {
            ProviderKind::OpenAi => (&self.openai_api_key, keys::ENV_OPENAI_API_KEY),
            ProviderKind::Anthropic => (&self.anthropic_api_key, keys::ENV_ANTHROPIC_API_KEY),
        };
        key.as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ClassifierError::ConfigurationError(format!(
                    "{} provider selected but {} is not set",
                    self.provider, var
                ))
            })
    }

    pub fn model(&self) -> &str {
        match self.provider {
            ProviderKind::OpenAi => &self.openai_model,
            ProviderKind::Anthropic => &self.anthropic_model,
        }
    }
}

fn redact(key: &Option<String>) -> &'static str {
    match key {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("openai_model", &self.openai_model)
            .field("anthropic_model", &self.anthropic_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("delay_ms", &self.delay_ms)
            .field("max_attempts", &self.max_attempts)
            .field("storage_dir", &self.storage_dir)
            .field("taxonomy_version", &self.taxonomy_version)
            .field("validation_stage", &self.validation_stage)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_model: provider::DEFAULT_OPENAI_MODEL.to_string(),
            anthropic_model: provider::DEFAULT_ANTHROPIC_MODEL.to_string(),
            temperature: provider::DEFAULT_TEMPERATURE,
            max_tokens: provider::DEFAULT_MAX_TOKENS,
            request_timeout_secs: provider::DEFAULT_REQUEST_TIMEOUT_SECS,
            delay_ms: batch::DEFAULT_DELAY_MS,
            max_attempts: batch::DEFAULT_MAX_ATTEMPTS,
            storage_dir: PathBuf::from(storage::DEFAULT_STORAGE_DIR),
            taxonomy_version: TaxonomyVersion::default(),
            validation_stage: true,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_provider_parse_safe_defaults_to_openai() {
        assert_eq!(ProviderKind::parse_safe("Claude"), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::parse_safe("anthropic"), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::parse_safe("mistral"), ProviderKind::OpenAi);
    }

    #[test]
    fn test_env_overlays_yaml() {
        let base = Config::from_yaml_str("provider: anthropic\ndelay_ms: 500\nvalidation_stage: false\n")
            .unwrap();
        assert_eq!(base.provider, ProviderKind::Anthropic);
        assert_eq!(base.max_attempts, 3);

        let config = base.with_overrides(lookup(&[
            ("CLASSIFIER_DELAY_MS", "0"),
            ("CLASSIFIER_MAX_ATTEMPTS", "not-a-number"),
            ("CLASSIFIER_TAXONOMY_VERSION", "v1"),
            ("ANTHROPIC_API_KEY", "sk-ant-secret"),
        ]));
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.taxonomy_version, TaxonomyVersion::V1);
        assert!(!config.validation_stage);
        assert_eq!(config.api_key().unwrap(), "sk-ant-secret");
        assert_eq!(config.model(), "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn test_api_keys_never_leak() {
        let config = Config {
            openai_api_key: Some("sk-live-123".to_string()),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("sk-live-123"));
        assert!(!serde_json::to_string(&config).unwrap().contains("sk-live-123"));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = Config::default().api_key().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = Config {
            max_attempts: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
