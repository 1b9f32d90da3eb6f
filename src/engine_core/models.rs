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

//! Domain models for the classification firewall.
//!
//! Pure data structures: the sanitized classification, the shape consumed by
//! the UI/export layer, and the per-URL batch record. No I/O lives here.

use crate::engine_core::types::Category;
use serde::{Deserialize, Serialize};

/// Category pair as the model proposed it, after the soft secondary check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct OriginalCategories {
    pub principal: Category,
    pub secundaria: Option<Category>,
}

/// Classification with every firewall invariant enforced.
///
/// Field names match the model's JSON contract so a sanitized result can be
/// fed back through the sanitizer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SanitizedClassification {
    pub categoria_principal: Category,
    pub categoria_secundaria: Option<Category>,
    pub tags_funcionais: Vec<String>,
    pub tags_caso_uso: Vec<String>,
    pub descricao: String,
    /// Always within [0, 1]
    pub confianca: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub debug_firewall_aplicado: bool,
    pub debug_host: String,
    pub debug_categoria_original: OriginalCategories,
    pub debug_warnings: Vec<String>,
}

/// Externally consumed shape (UI, export, persisted records)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ClassificationOutput {
    /// Primary first, then the optional secondary
    pub categories: Vec<Category>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub debug_firewall_aplicado: bool,
    #[serde(default)]
    pub debug_host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_categoria_original: Option<OriginalCategories>,
    #[serde(default)]
    pub debug_warnings: Vec<String>,
}

impl ClassificationOutput {
    pub fn primary(&self) -> Option<Category> {
        self.categories.first().copied()
    }

    pub fn secondary(&self) -> Option<Category> {
        self.categories.get(1).copied()
    }
}

/// Validator outcome kept next to a batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub warnings: Vec<String>,
    pub confidence: f64,
}

/// One batch item: a URL and either its classification or the failure message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolClassificationRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassificationOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationSummary>,
}

impl ToolClassificationRecord {
    pub fn success(
        url: impl Into<String>,
        result: ClassificationOutput,
        validation: Option<ValidationSummary>,
    ) -> Self {
        Self {
            url: url.into(),
            result: Some(result),
            error: None,
            validation,
        }
    }

    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: None,
            error: Some(error.into()),
            validation: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}
