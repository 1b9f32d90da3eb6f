//! Integration tests for the pre-submission validator
//! Covers:
//! - Penalty arithmetic and the URL-only ceiling
//! - Per-sector niche evidence (stricter than the sanitizer's pooled count)
//! - Both checks read the category as submitted
//! - Corrections merged back into the result

use toolclass_firewall::engine::matchers::BroadToolGroup;
use toolclass_firewall::engine::validator::{ClassificationValidator, ValidationWarning};
use toolclass_firewall::engine_core::models::ClassificationOutput;
use toolclass_firewall::engine_core::types::Category;

// --- Helpers ---

fn output(categories: Vec<Category>, tags: &[&str], confidence: Option<f64>) -> ClassificationOutput {
    ClassificationOutput {
        categories,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: String::new(),
        confidence,
        reasoning: None,
        debug_firewall_aplicado: true,
        debug_host: String::new(),
        debug_categoria_original: None,
        debug_warnings: vec![],
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// --- Tests ---

#[test]
fn test_clean_result_keeps_its_confidence() {
    let result = output(vec![Category::AudioEVoz], &["Voice Bot"], Some(0.9));
    let report = ClassificationValidator::validate(&result, "https://voice.example", "Voice agent");

    assert!(report.is_valid);
    assert!(report.warnings.is_empty());
    assert!(approx(report.confidence, 0.9));
    assert_eq!(report.corrections.categoria_principal, None);
}

#[test]
fn test_baseline_without_own_confidence() {
    let result = output(vec![Category::AudioEVoz], &["Voice Bot"], None);
    let report = ClassificationValidator::validate(&result, "https://voice.example", "Voice agent");
    assert!(approx(report.confidence, 0.8));
}

#[test]
fn test_broad_tool_still_niche_is_corrected() {
    let result = output(
        vec![Category::EspecificasENicho, Category::ImagemEDesign],
        &["Gerador de arte"],
        Some(0.9),
    );
    let report =
        ClassificationValidator::validate(&result, "https://www.midjourney.com", "Image generator");

    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::BroadToolNichePrimary { .. })));
    // "Image generator" names no sector, so the niche penalty stacks on top
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NicheWithoutSector)));
    assert_eq!(report.corrections.categoria_principal, Some(Category::ImagemEDesign));
    assert_eq!(report.corrections.categoria_secundaria, Some(None));
    assert!(approx(report.confidence, 0.45));

    let mut corrected = result.clone();
    corrected.apply_corrections(&report.corrections);
    assert_eq!(corrected.categories, vec![Category::ImagemEDesign]);
    assert_eq!(corrected.confidence, Some(report.confidence));
}

#[test]
fn test_broad_tool_niche_without_sector_takes_both_penalties() {
    let result = output(vec![Category::EspecificasENicho], &["Gerador de arte"], Some(0.9));
    let report = ClassificationValidator::validate(
        &result,
        "https://www.midjourney.com",
        "Art generator for everyone",
    );

    assert_eq!(
        report.warnings,
        vec![
            ValidationWarning::BroadToolNichePrimary {
                group: BroadToolGroup::MultiPurpose
            },
            ValidationWarning::NicheWithoutSector,
        ]
    );
    // The niche fallback replaces the broad-tool fallback
    assert_eq!(
        report.corrections.categoria_principal,
        Some(Category::NegociosEProdutividade)
    );
    assert_eq!(report.corrections.categoria_secundaria, Some(None));
    assert!(approx(report.confidence, 0.45));
}

#[test]
fn test_broad_tool_niche_with_sector_keeps_broad_correction() {
    let result = output(vec![Category::EspecificasENicho], &["Gerador de arte"], Some(0.9));
    let report = ClassificationValidator::validate(
        &result,
        "https://www.midjourney.com",
        "clinical notes for every patient",
    );

    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NicheConfirmed { .. })));
    assert_eq!(
        report.corrections.categoria_principal,
        Some(Category::CodigoEDesenvolvimento)
    );
    assert!(approx(report.confidence, 0.7));
}

#[test]
fn test_zero_confidence_falls_back_to_baseline() {
    let result = output(vec![Category::AudioEVoz], &["Voice Bot"], Some(0.0));
    let report = ClassificationValidator::validate(&result, "https://voice.example", "Voice agent");
    assert!(approx(report.confidence, 0.8));
}

#[test]
fn test_broad_tool_niche_secondary_penalty() {
    let result = output(
        vec![Category::AudioEVoz, Category::EspecificasENicho],
        &["Clonagem de voz"],
        Some(0.9),
    );
    let report = ClassificationValidator::validate(&result, "https://elevenlabs.io", "Voice cloning");
    assert!(approx(report.confidence, 0.8));
    assert_eq!(report.corrections.categoria_secundaria, Some(None));
}

#[test]
fn test_no_tags_is_critical() {
    let result = output(vec![Category::TextoERedacao], &[], Some(0.9));
    let report = ClassificationValidator::validate(&result, "https://writer.example", "Writer");

    assert!(!report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NoFunctionalTags)));
    assert!(approx(report.confidence, 0.6));
}

#[test]
fn test_niche_requires_hits_within_one_sector() {
    // Enough for the sanitizer's pooled count, not for the per-sector recount
    let result = output(vec![Category::EspecificasENicho], &["Automação de tarefas"], Some(0.9));
    let report = ClassificationValidator::validate(
        &result,
        "https://staff.example",
        "contract tooling for hospital staff",
    );

    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NicheWithoutSector)));
    assert_eq!(
        report.corrections.categoria_principal,
        Some(Category::NegociosEProdutividade)
    );
    assert!(approx(report.confidence, 0.65));
}

#[test]
fn test_niche_confirmed_by_sector() {
    let result = output(vec![Category::EspecificasENicho], &["Transcrição de áudio/vídeo"], Some(0.9));
    let report = ClassificationValidator::validate(
        &result,
        "https://scribe.example",
        "clinical notes for every patient",
    );

    assert!(report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NicheConfirmed { .. })));
    assert_eq!(report.corrections.categoria_principal, None);
    assert!(approx(report.confidence, 0.9));
}

#[test]
fn test_redundant_pairs_and_tag_count() {
    let result = output(
        vec![Category::ImagemEDesign],
        &[
            "IA para fotos",
            "Edição automática de imagem",
            "Background remover",
            "Cartoonizer",
            "Mockup generator",
            "Ilustração AI",
        ],
        Some(0.9),
    );
    let report = ClassificationValidator::validate(&result, "https://photos.example", "Photo editor");

    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::RedundantTags(pairs) if pairs.len() == 1)));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::TooManyTags(6))));
    assert!(approx(report.confidence, 0.85));
}

#[test]
fn test_url_only_ceiling() {
    let result = output(vec![Category::AudioEVoz], &["Voice Bot"], Some(0.95));
    let report = ClassificationValidator::validate(&result, "https://voice.example", "   ");

    assert!(approx(report.confidence, 0.6));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::UrlOnly)));

    // Already below the ceiling: untouched, no note
    let low = output(vec![Category::AudioEVoz], &["Voice Bot"], Some(0.5));
    let report = ClassificationValidator::validate(&low, "https://voice.example", "");
    assert!(approx(report.confidence, 0.5));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_confidence_never_negative() {
    let result = output(vec![Category::EspecificasENicho], &[], Some(0.1));
    let report = ClassificationValidator::validate(&result, "https://www.midjourney.com", "");
    assert_eq!(report.confidence, 0.0);
    assert_eq!(report.summary().confidence, 0.0);
    assert_eq!(report.summary().warnings.len(), report.warnings.len());
}
