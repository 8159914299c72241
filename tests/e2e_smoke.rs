//! Smoke tests for the fetch-model and smoke-test binaries
//!
//! These tests verify the binaries can be invoked and respond correctly.
//! Run with: `cargo test --test e2e_smoke`

use std::process::Command;

/// Test that fetch-model --help works
#[test]
fn test_fetch_model_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "fetch-model", "--", "--help"])
        .output()
        .expect("Failed to run fetch-model");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "fetch-model --help failed: stdout={}, stderr={}",
        stdout,
        stderr
    );

    assert!(
        stdout.contains("Usage:") || stdout.contains("fetch-model"),
        "Expected help output, got: {}",
        stdout
    );
}

/// Test that fetch-model --version works
#[test]
fn test_fetch_model_version() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "fetch-model", "--", "--version"])
        .output()
        .expect("Failed to run fetch-model");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "fetch-model --version failed");
    assert!(
        stdout.contains("fetch-model") || stdout.contains("0."),
        "Expected version output, got: {}",
        stdout
    );
}

/// Test that smoke-test --help works
#[test]
fn test_smoke_test_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "smoke-test", "--", "--help"])
        .output()
        .expect("Failed to run smoke-test");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "smoke-test --help failed: stdout={}, stderr={}",
        stdout,
        stderr
    );

    assert!(
        stdout.contains("model-dir") || stdout.contains("Sanity-check"),
        "Expected help output with model-dir option, got: {}",
        stdout
    );
}

/// Test that an invalid model id is rejected before any network call
#[test]
fn test_fetch_model_rejects_invalid_model_id() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "fetch-model",
            "--",
            "--model-id",
            "a/b/c",
        ])
        .output()
        .expect("Failed to run fetch-model");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Expected validation failure");
    assert!(
        stderr.contains("must be 'name' or 'org/name'"),
        "Expected model id validation error, got: {}",
        stderr
    );
}

/// Test that smoke-test against a directory with no checkpoint exits
/// non-zero and produces no generation result
#[test]
fn test_smoke_test_missing_checkpoint_fails() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let output = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "smoke-test",
            "--",
            "--model-dir",
            &temp_dir.path().to_string_lossy(),
        ])
        .output()
        .expect("Failed to run smoke-test");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        !output.status.success(),
        "Expected failure, got: stdout={}, stderr={}",
        stdout,
        stderr
    );
    assert!(
        !stdout.contains("Full response"),
        "No generation result should be produced, got: {}",
        stdout
    );
    assert!(
        stderr.contains("tokenizer.json"),
        "Expected missing tokenizer diagnostic, got: {}",
        stderr
    );
}

/// Test that smoke-test rejects a zero token cap
#[test]
fn test_smoke_test_rejects_zero_token_cap() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "smoke-test",
            "--",
            "--max-new-tokens",
            "0",
        ])
        .output()
        .expect("Failed to run smoke-test");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Expected validation failure");
    assert!(
        stderr.contains("max_new_tokens"),
        "Expected token cap validation error, got: {}",
        stderr
    );
}
