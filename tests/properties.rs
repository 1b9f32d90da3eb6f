use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use toolclass_firewall::engine::matchers::{classify_host_breadth, count_niche_keywords};
use toolclass_firewall::engine::sanitizer::ResultSanitizer;
use toolclass_firewall::engine_core::taxonomy::{TaxonomyRegistry, TaxonomyVersion};
use toolclass_firewall::engine_core::types::Category;

const URLS: &[&str] = &[
    "https://www.midjourney.com",
    "https://api.replicate.com/v1/models",
    "https://www.figma.com/ai",
    "https://designer.microsoft.com",
    "https://example-legal-tech.com",
    "https://clinic-notes.example",
    "https://voice.example/app",
    "not a url at all",
];

const DESCRIPTIONS: &[&str] = &[
    "",
    "Image generator",
    "Plataforma jurídica para automatizar contratos e compliance legal",
    "clinical notes for every patient",
    "contract tooling for hospital staff",
    "Industrial IoT dashboards for engineering teams",
];

const JUNK_TAGS: &[&str] = &["Design e criatividade", "Produtividade", "Arte incrível", "", "Geração de texto"];

fn category_label() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0..Category::ALL.len()).prop_map(|i| json!(Category::ALL[i].as_str())),
        Just(json!("OUTROS")),
        Just(json!(null)),
    ]
}

fn tag_value(whitelist: Vec<&'static str>) -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => proptest::sample::select(whitelist).prop_map(|t| json!(t)),
        2 => proptest::sample::select(JUNK_TAGS).prop_map(|t| json!(t)),
        1 => any::<i32>().prop_map(|n| json!(n)),
    ]
}

fn candidate(whitelist: Vec<&'static str>) -> impl Strategy<Value = Value> {
    (
        0..Category::ALL.len(),
        category_label(),
        proptest::collection::vec(tag_value(whitelist), 0..12),
        proptest::option::of(-1.0f64..2.0),
    )
        .prop_map(|(primary, secondary, tags, confianca)| {
            let mut obj = json!({
                "categoria_principal": Category::ALL[primary].as_str(),
                "categoria_secundaria": secondary,
                "tags_funcionais": tags,
            });
            if let Some(c) = confianca {
                obj["confianca"] = json!(c);
            }
            obj
        })
}

fn registry() -> TaxonomyRegistry {
    TaxonomyRegistry::new(TaxonomyVersion::V2)
}

proptest! {
    #[test]
    fn test_sanitized_output_holds_invariants(
        cand in candidate(registry().whitelist().to_vec()),
        url in proptest::sample::select(URLS),
        description in proptest::sample::select(DESCRIPTIONS),
    ) {
        let registry = registry();
        let sanitizer = ResultSanitizer::new(&registry);
        let repaired = sanitizer.sanitize(&cand, url, description).unwrap();
        let value = &repaired.value;

        prop_assert!(registry.is_valid_category(value.categoria_principal.as_str()));
        prop_assert!(value.categoria_secundaria != Some(value.categoria_principal));
        prop_assert!(value.tags_funcionais.len() <= 5);

        let unique: HashSet<&String> = value.tags_funcionais.iter().collect();
        prop_assert_eq!(unique.len(), value.tags_funcionais.len());
        for tag in &value.tags_funcionais {
            prop_assert!(registry.is_whitelisted_tag(tag));
            prop_assert!(!registry.is_blacklisted_tag(tag));
        }
        prop_assert!((0.0..=1.0).contains(&value.confianca));
        prop_assert!(value.debug_firewall_aplicado);
    }

    #[test]
    fn test_broad_tools_are_never_niche(
        cand in candidate(registry().whitelist().to_vec()),
        url in proptest::sample::select(URLS),
        description in proptest::sample::select(DESCRIPTIONS),
    ) {
        let registry = registry();
        let sanitizer = ResultSanitizer::new(&registry);
        let repaired = sanitizer.sanitize(&cand, url, description).unwrap();

        if classify_host_breadth(url).unwrap().is_broad {
            prop_assert!(!repaired.value.categoria_principal.is_niche());
            prop_assert!(!repaired.value.categoria_secundaria.is_some_and(|c| c.is_niche()));
        }
    }

    #[test]
    fn test_accepted_niche_has_evidence(
        cand in candidate(registry().whitelist().to_vec()),
        url in proptest::sample::select(URLS),
        description in proptest::sample::select(DESCRIPTIONS),
    ) {
        let registry = registry();
        let sanitizer = ResultSanitizer::new(&registry);
        let repaired = sanitizer.sanitize(&cand, url, description).unwrap();

        if repaired.value.categoria_principal.is_niche() {
            prop_assert!(count_niche_keywords(description, url) >= 2);
        }
    }

    #[test]
    fn test_sanitizing_twice_changes_nothing(
        cand in candidate(registry().whitelist().to_vec()),
        url in proptest::sample::select(URLS),
        description in proptest::sample::select(DESCRIPTIONS),
    ) {
        let registry = registry();
        let sanitizer = ResultSanitizer::new(&registry);
        let first = sanitizer.sanitize(&cand, url, description).unwrap();
        let replay = serde_json::to_value(&first.value).unwrap();
        let second = sanitizer.sanitize(&replay, url, description).unwrap();

        prop_assert_eq!(second.value.categoria_principal, first.value.categoria_principal);
        prop_assert_eq!(second.value.categoria_secundaria, first.value.categoria_secundaria);
        prop_assert_eq!(&second.value.tags_funcionais, &first.value.tags_funcionais);
        prop_assert!((second.value.confianca - first.value.confianca).abs() < 1e-9);
        for warning in &second.value.debug_warnings {
            prop_assert!(first.value.debug_warnings.contains(warning));
        }
    }

    #[test]
    fn test_sanitizer_never_panics_on_arbitrary_json(
        text in "\\PC*",
        url in "\\PC*",
    ) {
        let registry = registry();
        let sanitizer = ResultSanitizer::new(&registry);
        let _ = sanitizer.sanitize(&json!({"categoria_principal": text.clone(), "tags": [text]}), &url, "");
    }
}
