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

//! Firewall constants - single source of truth for thresholds and configuration keys.
//!
//! Every number that influences a classification outcome lives here so the
//! sanitizer and the validator can be audited side by side.

use crate::engine_core::types::Category;

/// Tag policy limits
pub mod limits {
    /// Hard cap on functional tags surviving sanitization
    pub const MAX_FUNCTIONAL_TAGS: usize = 5;
    /// Minimum keyword hits accepted as evidence for a niche classification
    pub const NICHE_EVIDENCE_THRESHOLD: usize = 2;
}

/// Categories substituted when a rule demotes the model's choice
pub mod fallback {
    use super::Category;

    /// Replacement when a known broad tool was classified as niche
    pub const BROAD_TOOL_CATEGORY: Category = Category::CodigoEDesenvolvimento;
    /// Replacement when a niche classification has no sector evidence
    pub const NICHE_CATEGORY: Category = Category::NegociosEProdutividade;
}

/// Confidence values used by the sanitizer
pub mod confidence {
    /// Assigned when the candidate carries no confidence and nothing was repaired
    pub const CLEAN: f64 = 0.85;
    /// Assigned when the candidate carries no confidence and at least one repair happened
    pub const REPAIRED: f64 = 0.7;
}

/// Confidence policy of the pre-submission validator.
///
/// Independent of [`confidence`]; the two tables are not reconciled.
pub mod validator {
    /// Baseline when the result carries no confidence
    pub const BASELINE: f64 = 0.8;
    /// Broad tool still classified niche as primary
    pub const PENALTY_BROAD_PRIMARY: f64 = 0.2;
    /// Broad tool still classified niche as secondary
    pub const PENALTY_BROAD_SECONDARY: f64 = 0.1;
    /// No functional tags at all
    pub const PENALTY_NO_TAGS: f64 = 0.3;
    /// Niche category without sector evidence
    pub const PENALTY_NICHE_WITHOUT_EVIDENCE: f64 = 0.25;
    /// At least one redundant tag pair present
    pub const PENALTY_REDUNDANT_TAGS: f64 = 0.05;
    /// Ceiling for classifications made from the URL alone
    pub const URL_ONLY_CEILING: f64 = 0.6;
}

/// Batch driver defaults
pub mod batch {
    /// Delay between two submissions
    pub const DEFAULT_DELAY_MS: u64 = 2000;
    /// Attempts per tool before recording a failure
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Multiplier applied to `delay * attempt` when backing off after a rate limit
    pub const RATE_LIMIT_BACKOFF_FACTOR: u32 = 2;
}

/// Local result persistence
pub mod storage {
    /// Storage key; the JSON file is named after it
    pub const STORAGE_KEY: &str = "classifier_batch_results";
    /// Default storage directory, relative to the working directory
    pub const DEFAULT_STORAGE_DIR: &str = ".toolclass-firewall";
    /// Prefix for exported files
    pub const EXPORT_FILE_PREFIX: &str = "classification-";
}

/// Provider defaults
pub mod provider {
    pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
    pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    /// HTTP status signalling upstream rate limiting
    pub const RATE_LIMIT_STATUS: u16 = 429;
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_CONFIG_PATH: &str = "CLASSIFIER_CONFIG_PATH";
    pub const ENV_PROVIDER: &str = "CLASSIFIER_PROVIDER";
    pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const ENV_OPENAI_MODEL: &str = "CLASSIFIER_OPENAI_MODEL";
    pub const ENV_ANTHROPIC_MODEL: &str = "CLASSIFIER_ANTHROPIC_MODEL";
    pub const ENV_DELAY_MS: &str = "CLASSIFIER_DELAY_MS";
    pub const ENV_MAX_ATTEMPTS: &str = "CLASSIFIER_MAX_ATTEMPTS";
    pub const ENV_STORAGE_DIR: &str = "CLASSIFIER_STORAGE_DIR";
    pub const ENV_TAXONOMY_VERSION: &str = "CLASSIFIER_TAXONOMY_VERSION";
    pub const ENV_VALIDATION_STAGE: &str = "CLASSIFIER_VALIDATION_STAGE";
    pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CLASSIFIER_REQUEST_TIMEOUT_SECS";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}
