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

//! Result sanitizer.
//!
//! Sits between raw model JSON and the rest of the application. Structural
//! problems (no object, no usable primary category) are fatal and returned as
//! [`SanitizeError`]. Every policy violation is repaired in place and explained
//! by a [`SanitizeWarning`], so callers always get a usable classification.

use crate::engine::matchers::{classify_host_breadth, niche_evidence};
use crate::engine_core::constants::{confidence, fallback, limits};
use crate::engine_core::errors::SanitizeError;
use crate::engine_core::models::{OriginalCategories, SanitizedClassification};
use crate::engine_core::taxonomy::TaxonomyRegistry;
use crate::engine_core::types::Category;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// How much a warning should lower trust in the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A repair (or note) recorded while sanitizing
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SanitizeWarning {
    /// Broad tool classified niche as primary; replaced
    BroadToolNichePrimary {
        host: String,
        pattern: &'static str,
        replacement: Category,
    },
    /// Broad tool classified niche as secondary; removed
    BroadToolNicheSecondary { host: String, pattern: &'static str },
    /// Niche primary without enough sector keywords; demoted
    NicheWithoutEvidence { found: usize, replacement: Category },
    /// Niche primary accepted
    NicheConfirmed { keywords: Vec<&'static str> },
    ForbiddenTagsRemoved(Vec<String>),
    UnlistedTagsRemoved(Vec<String>),
    TagCapExceeded { original: usize },
    NoFunctionalTags,
    ConfidenceClamped { original: f64 },
}

impl SanitizeWarning {
    pub fn severity(&self) -> Severity {
        match self {
            SanitizeWarning::NicheConfirmed { .. } => Severity::Info,
            SanitizeWarning::NoFunctionalTags => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

fn quoted(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for SanitizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeWarning::BroadToolNichePrimary {
                host,
                pattern,
                replacement,
            } => write!(
                f,
                "Known broad tool ({} on {}) cannot be {}; primary category replaced with {}",
                pattern,
                host,
                Category::EspecificasENicho,
                replacement
            ),
            SanitizeWarning::BroadToolNicheSecondary { host, pattern } => write!(
                f,
                "Known broad tool ({} on {}): secondary category {} removed",
                pattern,
                host,
                Category::EspecificasENicho
            ),
            SanitizeWarning::NicheWithoutEvidence { found, replacement } => write!(
                f,
                "{} without sector evidence ({} keyword(s) found, {} required); primary category replaced with {}",
                Category::EspecificasENicho,
                found,
                limits::NICHE_EVIDENCE_THRESHOLD,
                replacement
            ),
            SanitizeWarning::NicheConfirmed { keywords } => {
                write!(f, "Niche confirmed by sector keywords: {}", keywords.join(", "))
            }
            SanitizeWarning::ForbiddenTagsRemoved(tags) => {
                write!(f, "Forbidden tags removed: {}", quoted(tags))
            }
            SanitizeWarning::UnlistedTagsRemoved(tags) => {
                write!(f, "Tags outside the whitelist removed: {}", quoted(tags))
            }
            SanitizeWarning::TagCapExceeded { original } => write!(
                f,
                "{} functional tags after filtering; kept the first {}",
                original,
                limits::MAX_FUNCTIONAL_TAGS
            ),
            SanitizeWarning::NoFunctionalTags => {
                write!(f, "No functional tags left after sanitization")
            }
            SanitizeWarning::ConfidenceClamped { original } => {
                write!(f, "Confidence {} outside [0, 1] was clamped", original)
            }
        }
    }
}

/// A corrected value together with the ordered list of repairs that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub value: T,
    pub warnings: Vec<SanitizeWarning>,
}

impl<T> Repaired<T> {
    /// True when anything above informational level was recorded
    pub fn was_repaired(&self) -> bool {
        self.warnings.iter().any(|w| w.severity() > Severity::Info)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Stateless sanitizer bound to one taxonomy version
#[derive(Debug, Clone, Copy)]
pub struct ResultSanitizer<'a> {
    registry: &'a TaxonomyRegistry,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record(warnings: &mut Vec<SanitizeWarning>, warning: SanitizeWarning) {
    match warning.severity() {
        Severity::Info => debug!(note = %warning, "Sanitizer note"),
        _ => warn!(warning = %warning, "Sanitizer repair"),
    }
    warnings.push(warning);
}

fn string_field<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    obj.get(key).and_then(Value::as_str)
}

fn array_field<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

impl<'a> ResultSanitizer<'a> {
    pub fn new(registry: &'a TaxonomyRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a TaxonomyRegistry {
        self.registry
    }

    /// Repair one untrusted candidate.
    ///
    /// Deterministic in (candidate, url, description, registry version).
    pub fn sanitize(
        &self,
        candidate: &Value,
        url: &str,
        description: &str,
    ) -> Result<Repaired<SanitizedClassification>, SanitizeError> {
        debug!(url = %url, candidate = %candidate, "Sanitizer input");

        // 1. Structure
        let obj = candidate.as_object().ok_or_else(|| {
            SanitizeError::MalformedResult(format!(
                "expected a JSON object, got {}",
                json_type(candidate)
            ))
        })?;

        let primary_label = string_field(obj, "categoria_principal")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                SanitizeError::MalformedResult(
                    "categoria_principal missing or not a non-empty string".to_string(),
                )
            })?;

        // 2. Categories
        if !self.registry.is_valid_category(primary_label) {
            return Err(SanitizeError::InvalidCategory(primary_label.to_string()));
        }
        let mut primary: Category = primary_label
            .parse()
            .map_err(|_| SanitizeError::InvalidCategory(primary_label.to_string()))?;

        let mut secondary: Option<Category> = string_field(obj, "categoria_secundaria")
            .and_then(|s| s.parse::<Category>().ok())
            .filter(|c| *c != primary);

        let original = OriginalCategories {
            principal: primary,
            secundaria: secondary,
        };

        let mut warnings = Vec::new();

        // 3. Broad tools are never niche
        let breadth = classify_host_breadth(url)?;
        if let (true, Some(pattern)) = (breadth.is_broad, breadth.matched_pattern) {
            if primary.is_niche() {
                let replacement = secondary.unwrap_or(fallback::BROAD_TOOL_CATEGORY);
                record(
                    &mut warnings,
                    SanitizeWarning::BroadToolNichePrimary {
                        host: breadth.host.clone(),
                        pattern,
                        replacement,
                    },
                );
                primary = replacement;
                secondary = None;
            } else if secondary.is_some_and(|c| c.is_niche()) {
                record(
                    &mut warnings,
                    SanitizeWarning::BroadToolNicheSecondary {
                        host: breadth.host.clone(),
                        pattern,
                    },
                );
                secondary = None;
            }
        }

        // 4. Niche needs sector evidence
        if primary.is_niche() {
            let evidence = niche_evidence(description, url);
            if evidence.is_sufficient() {
                record(
                    &mut warnings,
                    SanitizeWarning::NicheConfirmed {
                        keywords: evidence.matched,
                    },
                );
            } else {
                let replacement = secondary.unwrap_or(fallback::NICHE_CATEGORY);
                record(
                    &mut warnings,
                    SanitizeWarning::NicheWithoutEvidence {
                        found: evidence.count,
                        replacement,
                    },
                );
                primary = replacement;
                secondary = None;
            }
        }

        // 5-6. Collect and filter functional tags
        let raw_tags = array_field(obj, "tags_funcionais")
            .or_else(|| array_field(obj, "tags"))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut kept = Vec::new();
        let mut forbidden = Vec::new();
        let mut unlisted = Vec::new();
        for tag in raw_tags.iter().filter_map(Value::as_str) {
            if self.registry.is_blacklisted_tag(tag) {
                forbidden.push(tag.to_string());
            } else if !self.registry.is_whitelisted_tag(tag) {
                unlisted.push(tag.to_string());
            } else {
                kept.push(tag.to_string());
            }
        }
        if !forbidden.is_empty() {
            record(&mut warnings, SanitizeWarning::ForbiddenTagsRemoved(forbidden));
        }
        if !unlisted.is_empty() {
            record(&mut warnings, SanitizeWarning::UnlistedTagsRemoved(unlisted));
        }

        // 7-8. Dedup, then cap
        let mut tags = dedup_preserving_order(kept);
        if tags.len() > limits::MAX_FUNCTIONAL_TAGS {
            record(
                &mut warnings,
                SanitizeWarning::TagCapExceeded {
                    original: tags.len(),
                },
            );
            tags.truncate(limits::MAX_FUNCTIONAL_TAGS);
        }

        // 9. Empty result is a signal, not an error
        if tags.is_empty() {
            record(&mut warnings, SanitizeWarning::NoFunctionalTags);
        }

        // 10. Use-case tags are free text
        let use_cases = array_field(obj, "tags_caso_uso")
            .map(|items| {
                dedup_preserving_order(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                )
            })
            .unwrap_or_default();

        // 11. Confidence and metadata
        let confianca = match obj.get("confianca").and_then(Value::as_f64) {
            Some(own) if (0.0..=1.0).contains(&own) => own,
            Some(own) => {
                record(
                    &mut warnings,
                    SanitizeWarning::ConfidenceClamped { original: own },
                );
                own.clamp(0.0, 1.0)
            }
            None if warnings.iter().any(|w| w.severity() > Severity::Info) => {
                confidence::REPAIRED
            }
            None => confidence::CLEAN,
        };

        let descricao = string_field(obj, "descricao")
            .or_else(|| string_field(obj, "description"))
            .unwrap_or_default()
            .to_string();

        let value = SanitizedClassification {
            categoria_principal: primary,
            categoria_secundaria: secondary,
            tags_funcionais: tags,
            tags_caso_uso: use_cases,
            descricao,
            confianca,
            reasoning: string_field(obj, "reasoning").map(str::to_string),
            debug_firewall_aplicado: true,
            debug_host: breadth.host,
            debug_categoria_original: original,
            debug_warnings: warnings.iter().map(ToString::to_string).collect(),
        };

        debug!(
            url = %url,
            primary = %value.categoria_principal,
            tags = value.tags_funcionais.len(),
            warnings = warnings.len(),
            confidence = value.confianca,
            "Sanitizer output"
        );

        Ok(Repaired { value, warnings })
    }
}
