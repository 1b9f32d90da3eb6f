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

// Command-line entry point for the classification firewall
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use toolclass_firewall::batch::driver::{BatchDriver, BatchOptions};
use toolclass_firewall::batch::metrics::calculate_metrics;
use toolclass_firewall::batch::store::ResultStore;
use toolclass_firewall::batch::transfer::{ExportDocument, ImportDocument};
use toolclass_firewall::config::{Config, ProviderKind};
use toolclass_firewall::engine::adapter::to_output;
use toolclass_firewall::engine::sanitizer::ResultSanitizer;
use toolclass_firewall::engine::validator::ClassificationValidator;
use toolclass_firewall::engine_core::models::ClassificationOutput;
use toolclass_firewall::engine_core::taxonomy::{TaxonomyRegistry, TaxonomyVersion};
use toolclass_firewall::llm::extract::extract_first_json_object;
use toolclass_firewall::llm::pipeline::{ClassificationPipeline, ClassificationRequest};
use toolclass_firewall::llm::provider;
use toolclass_firewall::utils::time;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Provider override ("openai" or "anthropic")
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Taxonomy version override ("v1" or "v2")
    #[arg(long, global = true)]
    taxonomy_version: Option<String>,

    /// Directory holding the stored batch results
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one or more tools through the configured provider
    Classify {
        /// Tool URLs
        urls: Vec<String>,

        /// Free-text description, applied to every URL
        #[arg(short, long)]
        description: Option<String>,

        /// Import document listing the tools to classify
        #[arg(long)]
        file: Option<PathBuf>,

        /// Skip the stage-2 correction prompt
        #[arg(long)]
        no_validation_stage: bool,

        /// Delay between submissions in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Do not persist results
        #[arg(long)]
        no_store: bool,
    },

    /// Sanitize a raw model reply read from a file or stdin (offline)
    Sanitize {
        #[arg(long)]
        url: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Reply file; stdin when absent or "-"
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the sanitized model shape instead of the export shape
        #[arg(long)]
        raw: bool,
    },

    /// Run the pre-submission validator over a classification result (offline)
    Validate {
        #[arg(long)]
        url: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Result file; stdin when absent or "-"
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print stored batch results
    Results,

    /// Export stored batch results to a timestamped JSON file
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Import a JSON document; stored results are appended, tools optionally classified
    Import {
        file: PathBuf,

        /// Classify the tools listed in the document
        #[arg(long)]
        classify: bool,
    },

    /// Delete stored batch results
    Clear,

    /// Aggregate metrics over stored batch results
    Metrics,

    /// Print the active taxonomy tables and their fingerprint
    Taxonomy,

    /// Print JSON schemas of the output shapes
    #[cfg(feature = "schema")]
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    install_panic_hook();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default().with_overrides(|key| std::env::var(key).ok())
    });

    // CLI flags take precedence over file and environment
    if let Some(p) = &cli.provider {
        config.provider = ProviderKind::parse_safe(p);
    }
    if let Some(v) = &cli.taxonomy_version {
        config.taxonomy_version = TaxonomyVersion::parse_safe(v);
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = dir.clone();
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    let registry = Arc::new(TaxonomyRegistry::new(config.taxonomy_version));
    let store = ResultStore::new(&config.storage_dir);

    match cli.command {
        Command::Classify {
            urls,
            description,
            file,
            no_validation_stage,
            delay_ms,
            no_store,
        } => {
            if no_validation_stage {
                config.validation_stage = false;
            }
            if let Some(ms) = delay_ms {
                config.delay_ms = ms;
            }

            let mut requests: Vec<ClassificationRequest> = urls
                .into_iter()
                .map(|url| ClassificationRequest::new(url, description.clone()))
                .collect();
            if let Some(path) = &file {
                let doc = ImportDocument::from_file(path)?;
                if let Some(kind) = doc.provider_hint().filter(|_| cli.provider.is_none()) {
                    config.provider = kind;
                }
                requests.extend(doc.requests());
            }
            if requests.is_empty() {
                bail!("nothing to classify: pass at least one URL or --file");
            }

            let report = run_batch(&config, registry, &requests, (!no_store).then_some(store)).await?;
            print_json(&report.records)?;
        }

        Command::Sanitize {
            url,
            description,
            input,
            raw,
        } => {
            let text = read_input(input.as_deref())?;
            let candidate = extract_first_json_object(&text)?;
            let sanitizer = ResultSanitizer::new(&registry);
            let repaired = sanitizer.sanitize(&candidate, &url, description.as_deref().unwrap_or(""))?;

            for warning in &repaired.warnings {
                info!(severity = %warning.severity(), "{}", warning);
            }
            if raw {
                print_json(&repaired.value)?;
            } else {
                print_json(&to_output(repaired.into_inner()))?;
            }
        }

        Command::Validate {
            url,
            description,
            input,
        } => {
            let text = read_input(input.as_deref())?;
            let mut result: ClassificationOutput =
                serde_json::from_value(extract_first_json_object(&text)?)
                    .context("input is not a classification result")?;
            let report =
                ClassificationValidator::validate(&result, &url, description.as_deref().unwrap_or(""));
            result.apply_corrections(&report.corrections);

            let warnings: Vec<_> = report
                .warnings
                .iter()
                .map(|w| json!({"severity": w.severity(), "message": w.to_string()}))
                .collect();
            print_json(&json!({
                "is_valid": report.is_valid,
                "confidence": report.confidence,
                "warnings": warnings,
                "result": result,
            }))?;
        }

        Command::Results => print_json(&store.load()?)?,

        Command::Export { dir } => {
            let records = store.load()?;
            if records.is_empty() {
                bail!("no stored results to export");
            }
            let at = time::now();
            let doc = ExportDocument::batch(records, "", config.provider.as_str(), at);
            let path = doc.write_to_dir(&dir, at)?;
            println!("{}", path.display());
        }

        Command::Import { file, classify } => {
            let doc = ImportDocument::from_file(&file)?;
            let imported = doc.records();
            if !imported.is_empty() {
                let mut records = store.load()?;
                records.extend(imported.iter().cloned());
                store.save(&records)?;
            }
            info!(
                file = %file.display(),
                records = imported.len(),
                tools = doc.requests().len(),
                "Document imported"
            );

            if classify {
                if let Some(kind) = doc.provider_hint().filter(|_| cli.provider.is_none()) {
                    config.provider = kind;
                }
                let report = run_batch(&config, registry, &doc.requests(), Some(store)).await?;
                print_json(&report.records)?;
            } else {
                print_json(&json!({
                    "records_imported": imported.len(),
                    "tools": doc.requests(),
                }))?;
            }
        }

        Command::Clear => {
            store.clear()?;
            println!("Cleared {}", store.path().display());
        }

        Command::Metrics => print_json(&calculate_metrics(&store.load()?))?,

        Command::Taxonomy => {
            let groups: Vec<_> = registry
                .groups()
                .into_iter()
                .map(|(name, tags)| json!({"name": name, "tags": tags}))
                .collect();
            print_json(&json!({
                "version": registry.version().as_str(),
                "fingerprint": registry.fingerprint(),
                "categories": registry.categories(),
                "groups": groups,
                "blacklist": registry.blacklist(),
            }))?;
        }

        #[cfg(feature = "schema")]
        Command::Schema => {
            use toolclass_firewall::engine_core::models::SanitizedClassification;
            print_json(&json!({
                "ClassificationOutput": schemars::schema_for!(ClassificationOutput),
                "SanitizedClassification": schemars::schema_for!(SanitizedClassification),
            }))?;
        }
    }

    Ok(())
}

async fn run_batch(
    config: &Config,
    registry: Arc<TaxonomyRegistry>,
    requests: &[ClassificationRequest],
    store: Option<ResultStore>,
) -> anyhow::Result<toolclass_firewall::batch::driver::BatchReport> {
    let provider = provider::from_config(config)?;
    info!(
        provider = provider.name(),
        model = config.model(),
        taxonomy = %registry.version(),
        tools = requests.len(),
        "Starting classification"
    );

    let pipeline = ClassificationPipeline::new(provider, registry)
        .with_validation_stage(config.validation_stage);
    let mut driver = BatchDriver::new(Arc::new(pipeline), BatchOptions::from_config(config));
    if let Some(store) = store {
        driver = driver.with_store(store);
    }
    Ok(driver.run(requests).await)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("cannot read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("toolclass_firewall=info,warn"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
