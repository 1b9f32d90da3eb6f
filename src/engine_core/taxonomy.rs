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

//! Taxonomy Registry.
//!
//! Fixed tables for the closed category set, the functional-tag whitelist and
//! the tag blacklist. Tables are literals compiled into the binary; a policy
//! change means a new [`TaxonomyVersion`], never a runtime mutation.

use crate::engine_core::types::Category;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// Thematic group of whitelisted functional tags
#[derive(Debug, Clone, Copy)]
pub struct TagGroup {
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

const TAG_GROUPS: [TagGroup; 7] = [
    TagGroup {
        name: "Texto e Redação",
        tags: &[
            "Copywriting",
            "Geração de texto",
            "Escrita criativa",
            "Resumo automático",
            "Reformulação de texto",
            "Storytelling",
            "E-mails automáticos",
            "Blog generator",
            "Editor de artigos",
            "Documentação automática",
            "Parafraseador",
            "Roteiros / Scripts",
            "Ferramentas educacionais (para estudantes)",
            "Verificador gramatical/ortográfico",
            "Geração de conteúdo SEO",
        ],
    },
    TagGroup {
        name: "Imagem e Design",
        tags: &[
            "Gerador de arte",
            "IA para fotos",
            "Edição automática de imagem",
            "Background remover",
            "Colorização automática",
            "Criação de logo",
            "Thumbnail generator",
            "Ilustração AI",
            "Geração de avatar",
            "Stylization / Filtros artísticos",
            "Cartoonizer",
            "Mockup generator",
            "IA para design gráfico",
            "Criação de banner/post digital",
            "Designer de interface UI/UX",
        ],
    },
    TagGroup {
        name: "Vídeo e Animação",
        tags: &[
            "Editor de vídeo IA",
            "Geração de vídeo a partir de texto",
            "Texto para animação",
            "Clipping automático",
            "Ferramentas para YouTube/TikTok/Reels",
            "Avatar animado",
            "Motion graphics AI",
            "Legendador automático",
            "Extração de highlights",
            "Efeitos especiais IA",
            "Ferramentas para webinar ou apresentações",
            "Geração de trailers",
            "História animada/manual storyboard",
            "Conversão de slides em vídeo",
        ],
    },
    TagGroup {
        name: "Áudio e Voz",
        tags: &[
            "Text-to-speech",
            "Clonagem de voz",
            "Narrador automático",
            "Criação de podcast",
            "Editor de áudio IA",
            "Transcrição de áudio/vídeo",
            "Música generativa",
            "Ambient sound generator",
            "Tradução automática voz",
            "Ferramentas para audiobooks",
            "Conversão voz para texto",
            "Enhancer de áudio (limpeza ruído)",
            "Dublagem automática",
            "Mídia multilingue voz",
        ],
    },
    TagGroup {
        name: "Negócios e Produtividade",
        tags: &[
            "Automação de tarefas",
            "Agendamento automático",
            "CRM inteligente",
            "Gerenciador de projetos",
            "Gestão de tempo",
            "IA para reuniões",
            "Análise de dados de vendas",
            "E-mail inteligente",
            "IA para planilhas",
            "Dashboards automáticos",
            "Gestão financeira",
            "Follow-up automático",
            "Gestão de equipes",
            "Ferramentas para trabalho remoto",
            "E-mail marketing",
            "CRM e segmentação",
            "Campanhas multicanal",
            "IA para marketing",
        ],
    },
    TagGroup {
        name: "Chatbots e Assistentes",
        tags: &[
            "Chatbot multi-idiomas",
            "Atendimento automático",
            "Suporte ao cliente IA",
            "FAQ inteligente",
            "Voice Bot",
            "Integrações omnichannel",
            "IA para central telefônica",
            "IA para WhatsApp/Telegram/etc.",
            "Avatar conversacional",
            "Assistente para reuniões",
            "IA para onboarding",
        ],
    },
    TagGroup {
        name: "Recursos Extras",
        tags: &[
            "Chrome Extension / Plugin",
            "API disponível",
            "Multi-idiomas",
            "Ferramenta para equipes",
            "Integrações (Zapier, Slack, Google, etc.)",
            "Ferramenta para mobile",
            "Compatível com Outros Softwares (Figma, Photoshop, Final Cut, etc.)",
        ],
    },
];

/// Generic tags models keep inventing
const BLACKLIST_BASE: &[&str] = &[
    "Design e criatividade",
    "Criação de conteúdo",
    "Criação de marketing",
    "Marketing e publicidade",
    "Interface no-code",
    "Inspiração",
    "Produtividade",
];

/// Formerly whitelisted tags judged too generic starting with V2
const RETIRED_IN_V2: &[&str] = &["Geração de texto"];

/// Version of the tag policy tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TaxonomyVersion {
    V1,
    #[default]
    V2,
}

impl TaxonomyVersion {
    pub fn parse_safe(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => TaxonomyVersion::V1,
            _ => TaxonomyVersion::V2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyVersion::V1 => "v1",
            TaxonomyVersion::V2 => "v2",
        }
    }

    fn retired_tags(&self) -> &'static [&'static str] {
        match self {
            TaxonomyVersion::V1 => &[],
            TaxonomyVersion::V2 => RETIRED_IN_V2,
        }
    }
}

impl fmt::Display for TaxonomyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable lookup tables for one taxonomy version.
///
/// Construct once at startup and pass by reference; nothing here mutates after `new`.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    version: TaxonomyVersion,
    whitelist: Vec<&'static str>,
    blacklist: Vec<&'static str>,
    whitelist_set: HashSet<&'static str>,
    blacklist_set: HashSet<&'static str>,
}

impl TaxonomyRegistry {
    pub fn new(version: TaxonomyVersion) -> Self {
        let retired = version.retired_tags();

        let whitelist: Vec<&'static str> = TAG_GROUPS
            .iter()
            .flat_map(|group| group.tags.iter().copied())
            .filter(|tag| !retired.contains(tag))
            .collect();

        let blacklist: Vec<&'static str> = BLACKLIST_BASE
            .iter()
            .chain(retired.iter())
            .copied()
            .collect();

        Self {
            version,
            whitelist_set: whitelist.iter().copied().collect(),
            blacklist_set: blacklist.iter().copied().collect(),
            whitelist,
            blacklist,
        }
    }

    pub fn version(&self) -> TaxonomyVersion {
        self.version
    }

    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    pub fn is_valid_category(&self, name: &str) -> bool {
        name.parse::<Category>().is_ok()
    }

    /// Exact match; no case folding or trimming.
    pub fn is_whitelisted_tag(&self, tag: &str) -> bool {
        self.whitelist_set.contains(tag)
    }

    pub fn is_blacklisted_tag(&self, tag: &str) -> bool {
        self.blacklist_set.contains(tag)
    }

    /// Whitelisted tags in declaration order
    pub fn whitelist(&self) -> &[&'static str] {
        &self.whitelist
    }

    pub fn blacklist(&self) -> &[&'static str] {
        &self.blacklist
    }

    /// Whitelisted tags grouped by theme, in declaration order.
    pub fn groups(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        TAG_GROUPS
            .iter()
            .map(|group| {
                let tags = group
                    .tags
                    .iter()
                    .copied()
                    .filter(|tag| self.is_whitelisted_tag(tag))
                    .collect();
                (group.name, tags)
            })
            .collect()
    }

    /// Tags present in both lists. Empty for every shipped version.
    pub fn overlaps(&self) -> Vec<&'static str> {
        self.whitelist
            .iter()
            .copied()
            .filter(|tag| self.blacklist_set.contains(tag))
            .collect()
    }

    /// SHA-256 over the version and every table entry in declaration order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.version.as_str().as_bytes());
        for (section, entries) in [
            ("categories", Category::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
            ("whitelist", self.whitelist.clone()),
            ("blacklist", self.blacklist.clone()),
        ] {
            hasher.update([0u8]);
            hasher.update(section.as_bytes());
            for entry in entries {
                hasher.update([0x1f]);
                hasher.update(entry.as_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::new(TaxonomyVersion::default())
    }
}
