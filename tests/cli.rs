use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toolclass-firewall"));
    cmd.env_remove("CLASSIFIER_CONFIG_PATH")
        .env_remove("CLASSIFIER_PROVIDER")
        .env_remove("CLASSIFIER_TAXONOMY_VERSION")
        .env_remove("CLASSIFIER_STORAGE_DIR")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env("RUST_LOG", "off");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_taxonomy_prints_tables_and_fingerprint() {
    let output = cli().arg("taxonomy").output().unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["version"], "v2");
    assert_eq!(value["categories"].as_array().unwrap().len(), 12);
    assert_eq!(value["groups"].as_array().unwrap().len(), 7);
    assert_eq!(value["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn test_taxonomy_version_flag() {
    let output = cli()
        .args(["--taxonomy-version", "v1", "taxonomy"])
        .output()
        .unwrap();
    let value = stdout_json(&output);
    assert_eq!(value["version"], "v1");
    assert_eq!(value["blacklist"].as_array().unwrap().len(), 7);
}

#[test]
fn test_sanitize_repairs_model_reply() {
    let reply = "Here is the classification:\n```json\n{\"categoria_principal\": \"ESPECÍFICAS E NICHO\", \
                 \"tags_funcionais\": [\"Copywriting\", \"Design e criatividade\", \"Copywriting\"]}\n```";

    let output = cli()
        .args(["sanitize", "--url", "https://www.midjourney.com"])
        .write_stdin(reply)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["categories"][0], "CÓDIGO E DESENVOLVIMENTO");
    assert_eq!(value["tags"], serde_json::json!(["Copywriting"]));
    assert_eq!(value["debug_firewall_aplicado"], true);
    assert!(!value["debug_warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_sanitize_rejects_unknown_category() {
    cli()
        .args(["sanitize", "--url", "https://a.example"])
        .write_stdin(r#"{"categoria_principal": "OUTROS"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("OUTROS"));
}

#[test]
fn test_validate_applies_corrections() {
    let result = r#"{"categories": ["ESPECÍFICAS E NICHO"], "tags": ["Gerador de arte"], "confidence": 0.9}"#;
    let output = cli()
        .args([
            "validate",
            "--url",
            "https://www.midjourney.com",
            "--description",
            "Image generator",
        ])
        .write_stdin(result)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["is_valid"], true);
    assert_eq!(value["result"]["categories"][0], "NEGÓCIOS E PRODUTIVIDADE");
    assert_eq!(value["warnings"][0]["severity"], "warning");
}

#[test]
fn test_results_metrics_and_clear_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().to_str().unwrap();

    let output = cli()
        .args(["--storage-dir", storage, "results"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), serde_json::json!([]));

    let output = cli()
        .args(["--storage-dir", storage, "metrics"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["total_classified"], 0);

    cli()
        .args(["--storage-dir", storage, "clear"])
        .assert()
        .success();

    cli()
        .args(["--storage-dir", storage, "export", "--dir", storage])
        .assert()
        .failure();
}

#[test]
fn test_import_then_export() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("store");
    let doc = dir.path().join("single.json");
    std::fs::write(
        &doc,
        r#"{"url": "https://voice.example", "provider": "openai",
            "result": {"categories": ["ÁUDIO E VOZ"], "tags": ["Voice Bot"], "confidence": 0.8}}"#,
    )
    .unwrap();

    cli()
        .arg("--storage-dir")
        .arg(&storage)
        .arg("import")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"records_imported\": 1"));

    let output = cli()
        .arg("--storage-dir")
        .arg(&storage)
        .args(["export", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let path = String::from_utf8(output.stdout).unwrap();
    let path = path.trim();
    assert!(path.contains("classification-"));
    let exported: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(exported["batch"], true);
    assert_eq!(exported["total"], 1);
}

#[test]
fn test_classify_without_api_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(["--storage-dir", dir.path().to_str().unwrap(), "classify", "https://a.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}
