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

// Domain error types - fatal conditions only; recoverable policy violations are warnings

use thiserror::Error;

/// Structural failures of the sanitizer.
///
/// Everything the sanitizer can repair is reported as a warning instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// Candidate is not an object or lacks a usable `categoria_principal`
    #[error("Malformed classification result: {0}")]
    MalformedResult(String),

    /// `categoria_principal` is a string but not a directory category
    #[error("Invalid primary category: {0}")]
    InvalidCategory(String),

    /// Source URL is blank, so no host can be derived
    #[error("Cannot derive a host from source URL '{0}'")]
    UnresolvableHost(String),
}

/// Main error type for the classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Upstream provider rejected the request with a rate limit (HTTP 429)
    #[error("Rate limited by {provider} (429): {message}")]
    RateLimited { provider: String, message: String },

    /// Upstream provider returned an error response
    #[error("Provider error ({provider}): {message}")]
    ProviderError { provider: String, message: String },

    /// Network-level failure talking to the provider
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Model reply contained no usable JSON object
    #[error("Response format error: {0}")]
    ResponseFormatError(String),

    /// Sanitizer refused the candidate
    #[error("Sanitizer error: {0}")]
    SanitizeError(#[from] SanitizeError),

    /// Result storage error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// I/O Error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ClassifierError {
    /// True for upstream rate limiting, the only condition the batch driver retries.
    ///
    /// Provider messages that mention 429 count too: some gateways wrap the
    /// status inside a generic error body.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ClassifierError::RateLimited { .. } => true,
            ClassifierError::ProviderError { message, .. } => message.contains("429"),
            _ => false,
        }
    }

    /// Get user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ClassifierError::ConfigurationError(reason) => {
                format!("Configuration problem: {}", reason)
            }
            ClassifierError::RateLimited { provider, .. } => {
                format!("{} is rate limiting requests, try again later", provider)
            }
            ClassifierError::ProviderError { provider, message } => {
                format!("{} failed: {}", provider, message)
            }
            ClassifierError::TransportError(_) => "Provider unreachable".to_string(),
            ClassifierError::ResponseFormatError(_) => {
                "Model reply did not contain a JSON object".to_string()
            }
            ClassifierError::SanitizeError(e) => format!("Unusable classification: {}", e),
            ClassifierError::StorageError(_) => "Could not access stored results".to_string(),
            ClassifierError::IoError(_) => "Internal system error".to_string(),
            ClassifierError::JsonError(_) => "Invalid JSON".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        let limited = ClassifierError::RateLimited {
            provider: "openai".to_string(),
            message: "slow down".to_string(),
        };
        assert!(limited.is_rate_limited());

        let wrapped = ClassifierError::ProviderError {
            provider: "gateway".to_string(),
            message: "upstream returned 429 Too Many Requests".to_string(),
        };
        assert!(wrapped.is_rate_limited());

        let other = ClassifierError::ProviderError {
            provider: "openai".to_string(),
            message: "invalid api key".to_string(),
        };
        assert!(!other.is_rate_limited());
        assert!(!ClassifierError::TransportError("timeout".to_string()).is_rate_limited());
    }

    #[test]
    fn test_sanitize_error_converts() {
        let err: ClassifierError =
            SanitizeError::InvalidCategory("OUTROS".to_string()).into();
        assert!(err.to_string().contains("OUTROS"));
        assert!(!err.is_rate_limited());
    }
}
