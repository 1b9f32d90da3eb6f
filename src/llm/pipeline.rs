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

//! Two-stage classification pipeline.
//!
//! stage 1 (generation) -> optional stage 2 (correction) -> sanitizer -> adapter.
//! Whatever the model says, only sanitized output leaves this module.

use crate::engine::adapter::to_output;
use crate::engine::sanitizer::ResultSanitizer;
use crate::engine_core::errors::ClassifierError;
use crate::engine_core::models::ClassificationOutput;
use crate::engine_core::taxonomy::TaxonomyRegistry;
use crate::llm::extract::extract_first_json_object;
use crate::llm::prompt;
use crate::llm::provider::CompletionProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One tool to classify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ClassificationRequest {
    pub fn new(url: impl Into<String>, description: Option<String>) -> Self {
        Self {
            url: url.into(),
            description,
        }
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Anything that turns a request into a firewalled classification
#[async_trait]
pub trait ToolClassifier: Send + Sync {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationOutput, ClassifierError>;
}

pub struct ClassificationPipeline {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<TaxonomyRegistry>,
    validation_stage: bool,
    generation_prompt: String,
    validation_prompt: String,
}

impl ClassificationPipeline {
    pub fn new(provider: Arc<dyn CompletionProvider>, registry: Arc<TaxonomyRegistry>) -> Self {
        let generation_prompt = prompt::generation_system_prompt(&registry);
        let validation_prompt = prompt::validation_system_prompt(&registry);
        Self {
            provider,
            registry,
            validation_stage: true,
            generation_prompt,
            validation_prompt,
        }
    }

    pub fn with_validation_stage(mut self, enabled: bool) -> Self {
        self.validation_stage = enabled;
        self
    }

    async fn generate(&self, request: &ClassificationRequest) -> Result<Value, ClassifierError> {
        let user = prompt::tool_prompt(&request.url, request.description.as_deref());
        let reply = self.provider.complete(&self.generation_prompt, &user).await?;
        extract_first_json_object(&reply)
    }

    /// Stage 2. Rate limits propagate so the caller can retry; any other
    /// failure keeps the stage-1 candidate, which is sanitized either way.
    async fn review(
        &self,
        request: &ClassificationRequest,
        preliminary: Value,
    ) -> Result<Value, ClassifierError> {
        let user = prompt::review_prompt(&request.url, request.description.as_deref(), &preliminary);
        let reviewed = match self.provider.complete(&self.validation_prompt, &user).await {
            Ok(reply) => extract_first_json_object(&reply),
            Err(e) => Err(e),
        };

        match reviewed {
            Ok(value) => Ok(value),
            Err(e) if e.is_rate_limited() => Err(e),
            Err(e) => {
                warn!(url = %request.url, error = %e, "Validation stage failed, keeping preliminary result");
                Ok(preliminary)
            }
        }
    }
}

#[async_trait]
impl ToolClassifier for ClassificationPipeline {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationOutput, ClassifierError> {
        debug!(
            url = %request.url,
            provider = self.provider.name(),
            validation_stage = self.validation_stage,
            "Classifying tool"
        );

        let mut candidate = self.generate(request).await?;
        if self.validation_stage {
            candidate = self.review(request, candidate).await?;
        }

        let sanitizer = ResultSanitizer::new(&self.registry);
        let repaired = sanitizer.sanitize(&candidate, &request.url, request.description_or_empty())?;

        info!(
            url = %request.url,
            category = %repaired.value.categoria_principal,
            tags = repaired.value.tags_funcionais.len(),
            repairs = repaired.warnings.len(),
            "Tool classified"
        );

        Ok(to_output(repaired.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::types::Category;
    use std::sync::Mutex;

    /// Replays canned replies in order and records the prompts it saw
    struct Scripted {
        replies: Mutex<Vec<Result<String, ClassifierError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, ClassifierError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                seen: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, _system: &str, user: &str) -> Result<String, ClassifierError> {
            self.seen.lock().unwrap().push(user.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ClassifierError::TransportError("script exhausted".into())))
        }
    }

    const NICHE_MIDJOURNEY: &str = r#"Sure! {"categoria_principal": "ESPECÍFICAS E NICHO",
        "tags_funcionais": ["Gerador de arte", "Texto para imagem"], "descricao": "Art"}"#;

    #[tokio::test]
    async fn test_single_stage_output_is_sanitized() {
        let provider = Scripted::new(vec![Ok(NICHE_MIDJOURNEY.to_string())]);
        let pipeline = ClassificationPipeline::new(provider.clone(), Arc::new(TaxonomyRegistry::default()))
            .with_validation_stage(false);

        let output = pipeline
            .classify(&ClassificationRequest::new("https://www.midjourney.com", None))
            .await
            .unwrap();

        assert_eq!(output.categories, vec![Category::CodigoEDesenvolvimento]);
        assert_eq!(output.confidence, Some(0.7));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_review_failure_keeps_preliminary() {
        let provider = Scripted::new(vec![
            Ok(r#"{"categoria_principal": "ÁUDIO E VOZ", "tags_funcionais": ["Voice Bot"]}"#.to_string()),
            Ok("no json here".to_string()),
        ]);
        let pipeline = ClassificationPipeline::new(provider.clone(), Arc::new(TaxonomyRegistry::default()));

        let output = pipeline
            .classify(&ClassificationRequest::new("https://voice.example", Some("Voice agent".into())))
            .await
            .unwrap();

        assert_eq!(output.categories, vec![Category::AudioEVoz]);
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].contains("Preliminary classification"));
    }

    #[tokio::test]
    async fn test_rate_limit_in_review_propagates() {
        let provider = Scripted::new(vec![
            Ok(r#"{"categoria_principal": "ÁUDIO E VOZ"}"#.to_string()),
            Err(ClassifierError::RateLimited {
                provider: "scripted".into(),
                message: "slow down".into(),
            }),
        ]);
        let pipeline = ClassificationPipeline::new(provider, Arc::new(TaxonomyRegistry::default()));

        let err = pipeline
            .classify(&ClassificationRequest::new("https://voice.example", None))
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }
}
