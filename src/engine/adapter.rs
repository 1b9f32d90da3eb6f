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

// Format adapter: sanitized classification -> externally consumed shape

use crate::engine_core::models::{ClassificationOutput, SanitizedClassification};

/// Convert a sanitized classification into the UI/export shape.
pub fn to_output(sanitized: SanitizedClassification) -> ClassificationOutput {
    let categories = std::iter::once(sanitized.categoria_principal)
        .chain(sanitized.categoria_secundaria)
        .collect();

    ClassificationOutput {
        categories,
        tags: sanitized.tags_funcionais,
        description: sanitized.descricao,
        confidence: Some(sanitized.confianca),
        reasoning: sanitized.reasoning,
        debug_firewall_aplicado: sanitized.debug_firewall_aplicado,
        debug_host: sanitized.debug_host,
        debug_categoria_original: Some(sanitized.debug_categoria_original),
        debug_warnings: sanitized.debug_warnings,
    }
}

impl From<SanitizedClassification> for ClassificationOutput {
    fn from(sanitized: SanitizedClassification) -> Self {
        to_output(sanitized)
    }
}
