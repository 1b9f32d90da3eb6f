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

// Aggregate metrics over a batch record list

use crate::engine_core::models::ToolClassificationRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchMetrics {
    pub total_classified: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// Primary and secondary categories both count
    pub by_category: BTreeMap<String, usize>,
    /// Mean over successful records that carry a confidence
    pub average_confidence: f64,
    /// Successful records whose result carries sanitizer warnings
    pub warnings_count: usize,
    pub empty_tags_count: usize,
}

pub fn calculate_metrics(records: &[ToolClassificationRecord]) -> BatchMetrics {
    let mut metrics = BatchMetrics {
        total_classified: records.len(),
        ..BatchMetrics::default()
    };
    let mut confidence_sum = 0.0;
    let mut confidence_count = 0usize;

    for record in records {
        if record.error.is_some() {
            metrics.error_count += 1;
            continue;
        }
        let Some(result) = &record.result else {
            continue;
        };

        metrics.success_count += 1;
        for category in &result.categories {
            *metrics.by_category.entry(category.to_string()).or_default() += 1;
        }
        if result.tags.is_empty() {
            metrics.empty_tags_count += 1;
        }
        if !result.debug_warnings.is_empty() {
            metrics.warnings_count += 1;
        }
        if let Some(confidence) = result.confidence {
            confidence_sum += confidence;
            confidence_count += 1;
        }
    }

    if confidence_count > 0 {
        metrics.average_confidence = confidence_sum / confidence_count as f64;
    }
    metrics
}
