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

//! Pre-submission validation.
//!
//! An independent second pass over already sanitized output. Both the broad-tool
//! and the niche-evidence checks read the category as submitted, so a broad tool
//! still labelled niche without sector evidence takes both penalties.

use crate::engine::matchers::{classify_host_breadth, detect_niche_sector, BroadToolGroup, NicheSector};
use crate::engine::sanitizer::Severity;
use crate::engine_core::constants::{fallback, limits, validator as policy};
use crate::engine_core::models::{ClassificationOutput, ValidationSummary};
use crate::engine_core::types::Category;
use std::fmt;
use tracing::debug;

/// Tag pairs that describe the same capability twice
const TAG_REDUNDANCY_PAIRS: [(&str, &str); 3] = [
    ("Geração de texto", "Copywriting"),
    ("Editor de vídeo IA", "Geração de vídeo a partir de texto"),
    ("IA para fotos", "Edição automática de imagem"),
];

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationWarning {
    BroadToolNichePrimary { group: BroadToolGroup },
    BroadToolNicheSecondary { group: BroadToolGroup },
    NoFunctionalTags,
    NicheWithoutSector,
    NicheConfirmed {
        sector: NicheSector,
        keywords: Vec<&'static str>,
    },
    RedundantTags(Vec<(&'static str, &'static str)>),
    TooManyTags(usize),
    UrlOnly,
}

impl ValidationWarning {
    pub fn severity(&self) -> Severity {
        match self {
            ValidationWarning::NoFunctionalTags => Severity::Critical,
            ValidationWarning::NicheConfirmed { .. } | ValidationWarning::UrlOnly => {
                Severity::Info
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::BroadToolNichePrimary { group } => write!(
                f,
                "Known tool of group {} must not use {}",
                group,
                Category::EspecificasENicho
            ),
            ValidationWarning::BroadToolNicheSecondary { group } => write!(
                f,
                "Secondary category {} removed (known tool of group {})",
                Category::EspecificasENicho,
                group
            ),
            ValidationWarning::NoFunctionalTags => {
                write!(f, "No functional tags assigned - classification is probably wrong")
            }
            ValidationWarning::NicheWithoutSector => write!(
                f,
                "{} without evidence of a specific sector",
                Category::EspecificasENicho
            ),
            ValidationWarning::NicheConfirmed { sector, keywords } => {
                write!(f, "Niche confirmed: {} ({})", sector, keywords.join(", "))
            }
            ValidationWarning::RedundantTags(pairs) => {
                let rendered: Vec<String> =
                    pairs.iter().map(|(a, b)| format!("{} / {}", a, b)).collect();
                write!(f, "Redundant tags detected: {}", rendered.join(", "))
            }
            ValidationWarning::TooManyTags(count) => write!(
                f,
                "More than {} tags assigned ({})",
                limits::MAX_FUNCTIONAL_TAGS,
                count
            ),
            ValidationWarning::UrlOnly => {
                write!(f, "Classification based on the URL only - confidence is limited")
            }
        }
    }
}

/// Fields the validator wants changed. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Corrections {
    pub categoria_principal: Option<Category>,
    /// `Some(None)` clears the secondary category
    pub categoria_secundaria: Option<Option<Category>>,
    pub confianca: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<ValidationWarning>,
    pub corrections: Corrections,
    pub confidence: f64,
}

impl ValidationReport {
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
            confidence: self.confidence,
        }
    }
}

impl ClassificationOutput {
    /// Merge validator corrections into this result.
    pub fn apply_corrections(&mut self, corrections: &Corrections) {
        let primary = corrections.categoria_principal.or(self.primary());
        let secondary = match corrections.categoria_secundaria {
            Some(replacement) => replacement,
            None => self.secondary(),
        };
        self.categories = primary.into_iter().chain(secondary).collect();
        self.confidence = Some(corrections.confianca);
    }
}

/// Post-hoc policy check over an adapted result.
///
/// Runs its own constants and its own per-sector recount; it never calls into
/// the sanitizer.
pub struct ClassificationValidator;

impl ClassificationValidator {
    pub fn validate(result: &ClassificationOutput, url: &str, description: &str) -> ValidationReport {
        let mut warnings = Vec::new();
        let mut corrections = Corrections::default();
        // Zero counts as missing, same as an absent score.
        let mut confidence = result
            .confidence
            .filter(|c| *c != 0.0 && !c.is_nan())
            .unwrap_or(policy::BASELINE);

        let primary = result.primary();
        let mut secondary = result.secondary();

        // A blank URL cannot be a known tool; the validator never fails.
        if let Some(group) = classify_host_breadth(url).ok().and_then(|b| b.group) {
            if primary.is_some_and(|c| c.is_niche()) {
                let replacement = secondary
                    .filter(|c| !c.is_niche())
                    .unwrap_or(fallback::BROAD_TOOL_CATEGORY);
                warnings.push(ValidationWarning::BroadToolNichePrimary { group });
                corrections.categoria_principal = Some(replacement);
                corrections.categoria_secundaria = Some(None);
                secondary = None;
                confidence -= policy::PENALTY_BROAD_PRIMARY;
            }

            if secondary.is_some_and(|c| c.is_niche()) {
                warnings.push(ValidationWarning::BroadToolNicheSecondary { group });
                corrections.categoria_secundaria = Some(None);
                confidence -= policy::PENALTY_BROAD_SECONDARY;
            }
        }

        if result.tags.is_empty() {
            warnings.push(ValidationWarning::NoFunctionalTags);
            confidence -= policy::PENALTY_NO_TAGS;
        }

        if primary.is_some_and(|c| c.is_niche()) {
            match detect_niche_sector(description, url) {
                Some(found) => warnings.push(ValidationWarning::NicheConfirmed {
                    sector: found.sector,
                    keywords: found.keywords,
                }),
                None => {
                    // Overrides any broad-tool replacement above.
                    let replacement = result
                        .secondary()
                        .filter(|c| !c.is_niche())
                        .unwrap_or(fallback::NICHE_CATEGORY);
                    warnings.push(ValidationWarning::NicheWithoutSector);
                    corrections.categoria_principal = Some(replacement);
                    corrections.categoria_secundaria = Some(None);
                    confidence -= policy::PENALTY_NICHE_WITHOUT_EVIDENCE;
                }
            }
        }

        let redundant = Self::redundant_pairs(&result.tags);
        if !redundant.is_empty() {
            warnings.push(ValidationWarning::RedundantTags(redundant));
            confidence -= policy::PENALTY_REDUNDANT_TAGS;
        }

        // Expected to be capped upstream already; warn only.
        if result.tags.len() > limits::MAX_FUNCTIONAL_TAGS {
            warnings.push(ValidationWarning::TooManyTags(result.tags.len()));
        }

        if description.trim().is_empty() && confidence > policy::URL_ONLY_CEILING {
            warnings.push(ValidationWarning::UrlOnly);
            confidence = policy::URL_ONLY_CEILING;
        }

        let confidence = confidence.clamp(0.0, 1.0);
        corrections.confianca = confidence;

        let is_valid = !warnings
            .iter()
            .any(|w| w.severity() == Severity::Critical);

        debug!(
            url = %url,
            is_valid,
            warnings = warnings.len(),
            confidence,
            "Pre-submission validation"
        );

        ValidationReport {
            is_valid,
            warnings,
            corrections,
            confidence,
        }
    }

    fn redundant_pairs(tags: &[String]) -> Vec<(&'static str, &'static str)> {
        TAG_REDUNDANCY_PAIRS
            .iter()
            .copied()
            .filter(|(a, b)| tags.iter().any(|t| t == a) && tags.iter().any(|t| t == b))
            .collect()
    }
}
