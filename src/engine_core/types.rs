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

//! Taxonomy Types.
//!
//! The closed category set as a Rust enum. A `Category` value can only exist
//! if it names one of the twelve directory categories, so everything past the
//! sanitizer's structural check is valid by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Top-level directory category.
///
/// Serialized with the exact labels the directory (and the model prompts) use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Category {
    #[serde(rename = "IMAGEM E DESIGN")]
    ImagemEDesign,
    #[serde(rename = "VÍDEO E ANIMAÇÃO")]
    VideoEAnimacao,
    #[serde(rename = "ÁUDIO E VOZ")]
    AudioEVoz,
    #[serde(rename = "TEXTO E REDAÇÃO")]
    TextoERedacao,
    #[serde(rename = "CHATBOTS E ASSISTENTES")]
    ChatbotsEAssistentes,
    #[serde(rename = "CÓDIGO E DESENVOLVIMENTO")]
    CodigoEDesenvolvimento,
    #[serde(rename = "NEGÓCIOS E PRODUTIVIDADE")]
    NegociosEProdutividade,
    #[serde(rename = "EDUCAÇÃO E TREINAMENTO")]
    EducacaoETreinamento,
    #[serde(rename = "SEGURANÇA E PRIVACIDADE")]
    SegurancaEPrivacidade,
    #[serde(rename = "DADOS E ANALYTICS")]
    DadosEAnalytics,
    #[serde(rename = "PESQUISA E CIÊNCIA")]
    PesquisaECiencia,
    #[serde(rename = "ESPECÍFICAS E NICHO")]
    EspecificasENicho,
}

impl Category {
    /// All categories in directory order.
    pub const ALL: [Category; 12] = [
        Category::ImagemEDesign,
        Category::VideoEAnimacao,
        Category::AudioEVoz,
        Category::TextoERedacao,
        Category::ChatbotsEAssistentes,
        Category::CodigoEDesenvolvimento,
        Category::NegociosEProdutividade,
        Category::EducacaoETreinamento,
        Category::SegurancaEPrivacidade,
        Category::DadosEAnalytics,
        Category::PesquisaECiencia,
        Category::EspecificasENicho,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ImagemEDesign => "IMAGEM E DESIGN",
            Category::VideoEAnimacao => "VÍDEO E ANIMAÇÃO",
            Category::AudioEVoz => "ÁUDIO E VOZ",
            Category::TextoERedacao => "TEXTO E REDAÇÃO",
            Category::ChatbotsEAssistentes => "CHATBOTS E ASSISTENTES",
            Category::CodigoEDesenvolvimento => "CÓDIGO E DESENVOLVIMENTO",
            Category::NegociosEProdutividade => "NEGÓCIOS E PRODUTIVIDADE",
            Category::EducacaoETreinamento => "EDUCAÇÃO E TREINAMENTO",
            Category::SegurancaEPrivacidade => "SEGURANÇA E PRIVACIDADE",
            Category::DadosEAnalytics => "DADOS E ANALYTICS",
            Category::PesquisaECiencia => "PESQUISA E CIÊNCIA",
            Category::EspecificasENicho => "ESPECÍFICAS E NICHO",
        }
    }

    /// The sector-specific category guarded by the broad-tool and evidence rules.
    pub fn is_niche(&self) -> bool {
        matches!(self, Category::EspecificasENicho)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of the twelve categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Exact, case-sensitive match on the directory label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
