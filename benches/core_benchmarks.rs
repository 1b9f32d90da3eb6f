use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use toolclass_firewall::engine::matchers::classify_host_breadth;
use toolclass_firewall::engine::sanitizer::ResultSanitizer;
use toolclass_firewall::engine_core::taxonomy::TaxonomyRegistry;
use toolclass_firewall::llm::extract::extract_first_json_object;

fn bench_sanitize(c: &mut Criterion) {
    let registry = TaxonomyRegistry::default();
    let sanitizer = ResultSanitizer::new(&registry);
    let candidate = json!({
        "categoria_principal": "ESPECÍFICAS E NICHO",
        "categoria_secundaria": "TEXTO E REDAÇÃO",
        "tags_funcionais": [
            "Copywriting", "Design e criatividade", "Copywriting", "Resumo automático",
            "Parafraseador", "Storytelling", "Blog generator", "Editor de artigos", "Inventada"
        ],
        "tags_caso_uso": ["Contratos", "Contratos"],
        "descricao": "Legal drafting assistant"
    });

    c.bench_function("sanitize_dirty_candidate", |b| {
        b.iter(|| {
            let _ = sanitizer.sanitize(
                black_box(&candidate),
                black_box("https://example-legal-tech.com"),
                black_box("Plataforma jurídica para automatizar contratos e compliance legal"),
            );
        })
    });
}

fn bench_host_breadth(c: &mut Criterion) {
    c.bench_function("classify_host_breadth", |b| {
        b.iter(|| {
            let _ = classify_host_breadth(black_box("https://designer.microsoft.com/image-creator"));
        })
    });
}

fn bench_extract(c: &mut Criterion) {
    let reply = "Sure, here it is:\n```json\n{\"categoria_principal\": \"ÁUDIO E VOZ\", \"tags_funcionais\": [\"Voice Bot\"]}\n```";
    c.bench_function("extract_first_json_object", |b| {
        b.iter(|| {
            let _ = extract_first_json_object(black_box(reply));
        })
    });
}

criterion_group!(benches, bench_sanitize, bench_host_breadth, bench_extract);
criterion_main!(benches);
