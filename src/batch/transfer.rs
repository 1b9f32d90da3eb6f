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

//! Import and export documents.
//!
//! Three shapes are accepted on import, tried in this order:
//! - exported batch: `{batch: true, results: [...]}`
//! - multi-tool list: `{tools: [{url, ...}], category?}`
//! - single tool: `{url, description?, provider?, result?}`

use crate::config::ProviderKind;
use crate::engine_core::constants::storage::EXPORT_FILE_PREFIX;
use crate::engine_core::errors::ClassifierError;
use crate::engine_core::models::{ClassificationOutput, ToolClassificationRecord};
use crate::llm::pipeline::ClassificationRequest;
use crate::utils::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDocument {
    pub batch: bool,
    #[serde(default)]
    pub total: usize,
    pub results: Vec<ToolClassificationRecord>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiToolDocument {
    pub tools: Vec<ToolEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDocument {
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassificationOutput>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImportDocument {
    Batch(BatchDocument),
    MultiTool(MultiToolDocument),
    Single(SingleDocument),
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ImportDocument {
    pub fn parse(content: &str) -> Result<Self, ClassifierError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        serde_json::from_value(value).map_err(|_| {
            ClassifierError::ResponseFormatError(
                "unrecognized import document: expected a batch export, a tools list or a single tool"
                    .to_string(),
            )
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Tools to (re)classify, blank URLs dropped.
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        match self {
            ImportDocument::Batch(doc) => {
                let description = non_blank(&doc.description);
                doc.results
                    .iter()
                    .filter_map(|r| non_blank(&r.url))
                    .map(|url| ClassificationRequest::new(url, description.clone()))
                    .collect()
            }
            ImportDocument::MultiTool(doc) => doc
                .tools
                .iter()
                .filter_map(|tool| {
                    non_blank(&tool.url).map(|url| {
                        ClassificationRequest::new(
                            url,
                            tool.description.as_deref().and_then(non_blank),
                        )
                    })
                })
                .collect(),
            ImportDocument::Single(doc) => non_blank(&doc.url)
                .map(|url| ClassificationRequest::new(url, non_blank(&doc.description)))
                .into_iter()
                .collect(),
        }
    }

    /// Results already present in the document.
    pub fn records(&self) -> Vec<ToolClassificationRecord> {
        match self {
            ImportDocument::Batch(doc) => doc.results.clone(),
            ImportDocument::MultiTool(_) => Vec::new(),
            ImportDocument::Single(doc) => doc
                .result
                .clone()
                .map(|result| ToolClassificationRecord::success(doc.url.clone(), result, None))
                .into_iter()
                .collect(),
        }
    }

    /// Provider named in the document, when it is one we know.
    pub fn provider_hint(&self) -> Option<ProviderKind> {
        let name = match self {
            ImportDocument::Batch(doc) => doc.provider.as_str(),
            ImportDocument::Single(doc) => doc.provider.as_str(),
            ImportDocument::MultiTool(_) => return None,
        };
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "claude" | "anthropic" => Some(ProviderKind::Anthropic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportDocument {
    Batch(BatchDocument),
    Single(SingleDocument),
}

impl ExportDocument {
    pub fn batch(
        records: Vec<ToolClassificationRecord>,
        description: &str,
        provider: &str,
        at: DateTime<Utc>,
    ) -> Self {
        ExportDocument::Batch(BatchDocument {
            batch: true,
            total: records.len(),
            results: records,
            description: description.to_string(),
            provider: provider.to_string(),
            timestamp: time::rfc3339(at),
        })
    }

    pub fn single(
        url: &str,
        description: &str,
        provider: &str,
        result: ClassificationOutput,
        at: DateTime<Utc>,
    ) -> Self {
        ExportDocument::Single(SingleDocument {
            url: url.to_string(),
            description: description.to_string(),
            provider: provider.to_string(),
            result: Some(result),
            timestamp: time::rfc3339(at),
        })
    }

    /// Write into `dir` as `classification-<unix millis>.json`, returning the path.
    pub fn write_to_dir(&self, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, ClassifierError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_file_name(at));
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}.json", EXPORT_FILE_PREFIX, time::unix_millis(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_multi_tool_import_drops_blank_urls() {
        let doc = ImportDocument::parse(
            r#"{"tools": [{"url": "https://a.io"}, {"url": ""}, {"url": "https://b.io", "description": "Voice"}], "category": "ÁUDIO E VOZ"}"#,
        )
        .unwrap();
        assert!(matches!(doc, ImportDocument::MultiTool(_)));
        let requests = doc.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].description.as_deref(), Some("Voice"));
        assert!(doc.records().is_empty());
    }

    #[test]
    fn test_single_import_with_result() {
        let doc = ImportDocument::parse(
            &json!({
                "url": "https://a.io",
                "provider": "claude",
                "result": {"categories": ["ÁUDIO E VOZ"], "tags": ["Voice Bot"]}
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(doc.provider_hint(), Some(ProviderKind::Anthropic));
        assert_eq!(doc.records().len(), 1);
        assert_eq!(doc.requests()[0].description, None);
    }

    #[test]
    fn test_batch_export_reimports() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let records = vec![ToolClassificationRecord::failure("https://a.io", "boom")];
        let exported = ExportDocument::batch(records.clone(), "", "openai", at);
        let text = serde_json::to_string(&exported).unwrap();
        assert!(text.contains("\"total\":1"));
        assert!(text.contains("2025-03-01T12:00:00.000Z"));

        let doc = ImportDocument::parse(&text).unwrap();
        assert_eq!(doc.records(), records);
        assert_eq!(doc.provider_hint(), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(ImportDocument::parse(r#"{"foo": 1}"#).is_err());
        assert!(ImportDocument::parse("not json").is_err());
    }

    #[test]
    fn test_export_file_name() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(export_file_name(at), "classification-1700000000123.json");
    }
}
