//! Smoke-test pipeline integration tests
//!
//! The end-to-end test needs a real downloaded checkpoint; point
//! MODEL_PREP_TEST_MODEL_DIR at one (any small llama-family chat model
//! fetched with fetch-model works) and run with --ignored.

use model_prep::config::SmokeTestConfig;
use model_prep::error::SmokeError;
use model_prep::generation::run_smoke_test;
use std::path::PathBuf;

#[test]
#[ignore = "requires a downloaded checkpoint in MODEL_PREP_TEST_MODEL_DIR"]
fn test_smoke_test_generates_bounded_output() {
    let model_dir = std::env::var("MODEL_PREP_TEST_MODEL_DIR")
        .expect("Set MODEL_PREP_TEST_MODEL_DIR to a downloaded checkpoint directory");

    let mut config = SmokeTestConfig {
        model_dir: PathBuf::from(model_dir),
        ..Default::default()
    };
    config.generation.max_new_tokens = 20;

    let report = run_smoke_test(&config).expect("Smoke test failed");

    // Rendered prompt is non-empty and carries the user content
    assert!(!report.prompt.is_empty());
    assert!(report.prompt.contains("Hello! What can you help me with?"));

    assert!(report.input_tokens > 0);
    assert!(report.generated_tokens > 0);
    assert!(report.generated_tokens <= config.generation.max_new_tokens);
    assert!(!report.response.is_empty());
}

#[test]
fn test_smoke_test_empty_dir_reports_missing_tokenizer() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = SmokeTestConfig {
        model_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };

    match run_smoke_test(&config) {
        Err(SmokeError::MissingFile(path)) => assert!(path.ends_with("tokenizer.json")),
        other => panic!("Expected MissingFile, got {:?}", other.map(|r| r.generated_tokens)),
    }
}

#[test]
fn test_smoke_test_unparseable_tokenizer_fails() {
    // A present but invalid tokenizer file fails at load, before any
    // weight loading or generation
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("tokenizer.json"), "{}").unwrap();

    let config = SmokeTestConfig {
        model_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };

    let result = run_smoke_test(&config);
    assert!(result.is_err());
}
