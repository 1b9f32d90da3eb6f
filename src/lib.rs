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

//! toolclass-firewall: an output firewall for LLM-based AI tool classification.
//!
//! A language model proposes a category pair and functional tags for an AI
//! tool; this crate guarantees that whatever it proposes, only results drawn
//! from a closed taxonomy and a fixed tag whitelist reach the directory.
//! Known broad tools are never classified as niche, niche classifications
//! need keyword evidence, and every repair is reported as a warning.

pub mod batch;
pub mod config;
pub mod engine;
pub mod engine_core;
pub mod llm;
pub mod utils;
