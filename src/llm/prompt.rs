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

//! Prompt rendering.
//!
//! Prompts are rendered from the same registry and matcher tables the
//! sanitizer enforces, so the instructions given to the model and the rules
//! applied to its output cannot drift apart.

use crate::engine::matchers::{broad_tool_patterns, niche_vocabulary};
use crate::engine_core::constants::limits;
use crate::engine_core::taxonomy::TaxonomyRegistry;
use crate::engine_core::types::Category;
use serde_json::Value;
use std::fmt::Write;

const RESPONSE_FORMAT: &str = r#"{
  "categoria_principal": "CATEGORY",
  "categoria_secundaria": "CATEGORY or null",
  "tags_funcionais": ["tag1", "tag2", "tag3"],
  "tags_caso_uso": [],
  "descricao": "Objective description of the tool",
  "confianca": 0.85,
  "reasoning": "Short justification: category based on X, tags chosen because of Y"
}"#;

fn policy_section(registry: &TaxonomyRegistry) -> String {
    let mut out = String::new();

    out.push_str("OFFICIAL CATEGORIES (closed list, use at most 2):\n");
    for category in registry.categories() {
        let _ = writeln!(out, "- {}", category);
    }

    let _ = writeln!(
        out,
        "\nNICHE RULE: use \"{}\" only when the description explicitly names a specific sector \
         with at least {} of its keywords. Recognized sectors:",
        Category::EspecificasENicho,
        limits::NICHE_EVIDENCE_THRESHOLD
    );
    for (sector, keywords) in niche_vocabulary() {
        let _ = writeln!(out, "- {}: {}", sector, keywords.join(", "));
    }

    out.push_str("\nKNOWN BROAD TOOLS (never niche, classify by main function):\n");
    for (group, patterns) in broad_tool_patterns() {
        let _ = writeln!(out, "- {}: {}", group, patterns.join(", "));
    }

    let _ = writeln!(
        out,
        "\nALLOWED FUNCTIONAL TAGS (whitelist, copy the text exactly, never invent, translate or adjust tags):"
    );
    for (group, tags) in registry.groups() {
        let _ = writeln!(out, "{}: {}", group, tags.join(" | "));
    }

    out.push_str("\nFORBIDDEN TAGS (never use):\n");
    for tag in registry.blacklist() {
        let _ = writeln!(out, "- \"{}\"", tag);
    }

    let _ = writeln!(
        out,
        "\nHARD LIMIT: at most {} functional tags. If \"{}\" is the primary category, leave categoria_secundaria null.",
        limits::MAX_FUNCTIONAL_TAGS,
        Category::EspecificasENicho
    );

    out
}

/// Stage 1: contextual analysis and first classification.
pub fn generation_system_prompt(registry: &TaxonomyRegistry) -> String {
    format!(
        "You are an expert classifier of AI tools for a large directory.\n\n\
         STEP 1 - CONTEXT: identify the tool type (infrastructure, end-user app, platform, plugin), \
         the audience and whether its scope is sector specific or multi-purpose.\n\n\
         STEP 2 - RULES:\n{}\n\
         STEP 3 - TAGS: prefer tags describing core features, avoid generic or redundant tags and \
         use at most one tag from \"Recursos Extras\".\n\n\
         RESPONSE FORMAT (JSON only, no extra text):\n{}\n",
        policy_section(registry),
        RESPONSE_FORMAT
    )
}

/// Stage 2: review and correct a preliminary classification.
pub fn validation_system_prompt(registry: &TaxonomyRegistry) -> String {
    format!(
        "You are the validation stage of an automatic AI tool classifier. You receive a tool and a \
         preliminary classification produced by another model. Correct every rule violation and \
         return the full corrected classification.\n\n\
         RULES:\n{}\n\
         Remove any forbidden or unlisted tag suggested by the preliminary classification.\n\n\
         RESPONSE FORMAT (JSON only, no extra text):\n{}\n",
        policy_section(registry),
        RESPONSE_FORMAT
    )
}

/// User message shared by both stages.
pub fn tool_prompt(url: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!("URL: {}\n\nDescription: {}", url, description),
        None => format!("URL: {}", url),
    }
}

/// Stage-2 user message: the tool plus the preliminary classification.
pub fn review_prompt(url: &str, description: Option<&str>, preliminary: &Value) -> String {
    let rendered = serde_json::to_string_pretty(preliminary).unwrap_or_else(|_| preliminary.to_string());
    format!(
        "{}\n\nPreliminary classification:\n{}",
        tool_prompt(url, description),
        rendered
    )
}
