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

//! Heuristic matchers.
//!
//! Pure functions over a tool's URL and description:
//! - broad-tool detection by substring match of the host against curated patterns
//! - niche-sector evidence by counting sector keywords in description + URL

use crate::engine_core::constants::limits::NICHE_EVIDENCE_THRESHOLD;
use crate::engine_core::errors::SanitizeError;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Family of a known broad / multi-purpose tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadToolGroup {
    Infrastructure,
    ProfessionalDesign,
    MultiPurpose,
    CreativeSuites,
}

impl fmt::Display for BroadToolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BroadToolGroup::Infrastructure => "infrastructure",
            BroadToolGroup::ProfessionalDesign => "professional_design",
            BroadToolGroup::MultiPurpose => "multi_purpose",
            BroadToolGroup::CreativeSuites => "creative_suites",
        };
        f.write_str(label)
    }
}

// Patterns are pairwise disjoint, so evaluation order never changes the outcome.
const BROAD_TOOL_PATTERNS: &[(BroadToolGroup, &[&str])] = &[
    (
        BroadToolGroup::Infrastructure,
        &[
            "replicate.com",
            "huggingface.co",
            "modal.com",
            "runpod.io",
            "runware.ai",
        ],
    ),
    (
        BroadToolGroup::ProfessionalDesign,
        &["figma.com", "adobe.com", "sketch.com", "canva.com"],
    ),
    (
        BroadToolGroup::MultiPurpose,
        &[
            "midjourney.com",
            "runway.ml",
            "runwayml.com",
            "elevenlabs.io",
            "copy.ai",
            "jasper.ai",
            "descript.com",
            "synthesia.io",
            "heygen.com",
            "loom.com",
            "openai.com",
            "anthropic.com",
        ],
    ),
    (
        BroadToolGroup::CreativeSuites,
        &["designer.microsoft.com", "google.com", "freepik.com"],
    ),
];

/// Sector whose keywords justify the niche category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NicheSector {
    Legal,
    Medical,
    Financial,
    Accounting,
    Education,
    Engineering,
    Architecture,
    Scientific,
}

impl fmt::Display for NicheSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NicheSector::Legal => "legal",
            NicheSector::Medical => "medical",
            NicheSector::Financial => "financial",
            NicheSector::Accounting => "accounting",
            NicheSector::Education => "education",
            NicheSector::Engineering => "engineering",
            NicheSector::Architecture => "architecture",
            NicheSector::Scientific => "scientific",
        };
        f.write_str(label)
    }
}

const NICHE_VOCABULARY: &[(NicheSector, &[&str])] = &[
    (
        NicheSector::Legal,
        &[
            "legal",
            "law",
            "contract",
            "compliance",
            "tribunal",
            "advocacia",
            "jurídico",
            "contrato",
        ],
    ),
    (
        NicheSector::Medical,
        &[
            "medical",
            "health",
            "hospital",
            "diagnosis",
            "patient",
            "clinical",
            "médico",
            "saúde",
            "clínica",
        ],
    ),
    (
        NicheSector::Financial,
        &[
            "banking",
            "finance",
            "trading",
            "investment",
            "credit",
            "loan",
            "financeiro",
            "banco",
        ],
    ),
    (
        NicheSector::Accounting,
        &["accounting", "tax", "fiscal", "audit", "contábil", "impostos"],
    ),
    (
        NicheSector::Education,
        &[
            "school",
            "university",
            "education",
            "learning",
            "course",
            "educação",
            "escola",
            "universidade",
        ],
    ),
    (
        NicheSector::Engineering,
        &[
            "engineering",
            "CAD",
            "manufacturing",
            "industrial",
            "IoT",
            "engenharia",
        ],
    ),
    (
        NicheSector::Architecture,
        &[
            "architecture",
            "construction",
            "building",
            "arquitetura",
            "construção",
        ],
    ),
    (
        NicheSector::Scientific,
        &[
            "research",
            "scientific",
            "lab",
            "academic",
            "journal",
            "científico",
            "pesquisa",
        ],
    ),
];

/// Curated broad-tool host patterns, grouped
pub fn broad_tool_patterns() -> &'static [(BroadToolGroup, &'static [&'static str])] {
    BROAD_TOOL_PATTERNS
}

/// Sector keyword vocabulary
pub fn niche_vocabulary() -> &'static [(NicheSector, &'static [&'static str])] {
    NICHE_VOCABULARY
}

/// Outcome of the broad-tool check for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBreadth {
    pub host: String,
    pub is_broad: bool,
    pub matched_pattern: Option<&'static str>,
    pub group: Option<BroadToolGroup>,
}

/// Keywords found across the whole sector vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NicheEvidence {
    pub count: usize,
    /// Matched keywords in vocabulary order
    pub matched: Vec<&'static str>,
}

impl NicheEvidence {
    pub fn is_sufficient(&self) -> bool {
        self.count >= NICHE_EVIDENCE_THRESHOLD
    }
}

/// A single sector with enough hits on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorMatch {
    pub sector: NicheSector,
    pub keywords: Vec<&'static str>,
}

/// Lowercase hostname of `url`.
///
/// Falls back to the whole lowercased input when the URL does not parse or
/// has no host. Only a blank input is an error.
pub fn resolve_host(url: &str) -> Result<String, SanitizeError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(SanitizeError::UnresolvableHost(url.to_string()));
    }

    let host = Url::parse(trimmed)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| trimmed.to_lowercase());

    Ok(host)
}

/// Match an already resolved host against the broad-tool patterns. First match wins.
pub fn classify_host(host: &str) -> HostBreadth {
    for (group, patterns) in BROAD_TOOL_PATTERNS {
        if let Some(pattern) = patterns.iter().copied().find(|p| host.contains(p)) {
            return HostBreadth {
                host: host.to_string(),
                is_broad: true,
                matched_pattern: Some(pattern),
                group: Some(*group),
            };
        }
    }

    HostBreadth {
        host: host.to_string(),
        is_broad: false,
        matched_pattern: None,
        group: None,
    }
}

/// Resolve the host of `url` and run the broad-tool check on it.
pub fn classify_host_breadth(url: &str) -> Result<HostBreadth, SanitizeError> {
    let host = resolve_host(url)?;
    Ok(classify_host(&host))
}

fn search_text(description: &str, url: &str) -> String {
    format!("{} {}", description, url).to_lowercase()
}

/// Keywords from the combined 8-sector pool that occur in description + URL.
pub fn niche_evidence(description: &str, url: &str) -> NicheEvidence {
    let text = search_text(description, url);
    let matched: Vec<&'static str> = NICHE_VOCABULARY
        .iter()
        .flat_map(|(_, keywords)| keywords.iter().copied())
        .filter(|kw| text.contains(&kw.to_lowercase()))
        .collect();

    NicheEvidence {
        count: matched.len(),
        matched,
    }
}

/// Number of sector keywords occurring in description + URL (all sectors combined).
pub fn count_niche_keywords(description: &str, url: &str) -> usize {
    niche_evidence(description, url).count
}

/// First sector that reaches the evidence threshold by its own keywords alone.
///
/// Stricter than [`niche_evidence`]; the pre-submission validator uses this as
/// its independent recount.
pub fn detect_niche_sector(description: &str, url: &str) -> Option<SectorMatch> {
    let text = search_text(description, url);

    NICHE_VOCABULARY.iter().find_map(|(sector, keywords)| {
        let hits: Vec<&'static str> = keywords
            .iter()
            .copied()
            .filter(|kw| text.contains(&kw.to_lowercase()))
            .collect();

        (hits.len() >= NICHE_EVIDENCE_THRESHOLD).then(|| SectorMatch {
            sector: *sector,
            keywords: hits,
        })
    })
}
