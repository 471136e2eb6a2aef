//! End-to-end tests for the `question-classifier` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const ARTIFACT_ENV: &str = "QUESTION_CLASSIFIER_ARTIFACT_DIR";

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("question-classifier").unwrap();
    cmd.env_remove(ARTIFACT_ENV).env("RUST_LOG", "question_classifier=info");
    cmd
}

/// Train a deliberately tiny model so the round trip stays fast on CPU.
fn train_tiny(root: &Path) -> std::path::PathBuf {
    let output = root.join("trained_model");
    bin()
        .current_dir(root)
        .args(["train", "--output-dir"])
        .arg(&output)
        .args([
            "--epochs", "1",
            "--d-model", "16",
            "--num-heads", "2",
            "--num-layers", "1",
            "--d-ff", "32",
            "--max-seq-len", "32",
        ])
        .arg("--checkpoint-dir")
        .arg(root.join("results"))
        .arg("--logging-dir")
        .arg(root.join("logs"))
        .assert()
        .success();
    output
}

fn predict(artifact: &Path, request: Option<&str>) -> assert_cmd::assert::Assert {
    let mut cmd = bin();
    cmd.arg("predict").arg("--artifact-dir").arg(artifact);
    if let Some(request) = request {
        cmd.arg(request);
    }
    cmd.assert()
}

#[test]
fn test_predict_without_artifact_fails() {
    let temp = TempDir::new().unwrap();
    predict(&temp.path().join("missing"), Some(r#"{"text": "اذكر عاصمة فرنسا."}"#))
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("{\"error\":").and(predicate::str::contains("not found")));
}

#[test]
fn test_hyphen_request_and_extra_args_reach_the_error_channel() {
    let temp    = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    for extra in [vec!["-1"], vec![r#"{"text": "x"}"#, "extra"]] {
        bin()
            .arg("predict")
            .arg("--artifact-dir")
            .arg(&missing)
            .args(&extra)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("{\"error\":"));
    }
}

#[test]
fn test_predict_with_no_artifact_dir_configured() {
    bin()
        .args(["predict", r#"{"text": "اذكر عاصمة فرنسا."}"#])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no artifact directory configured"));
}

#[test]
fn test_train_requires_output_dir() {
    bin().arg("train").assert().failure();
}

#[test]
fn test_train_then_predict_round_trip() {
    let temp     = TempDir::new().unwrap();
    let artifact = train_tiny(temp.path());

    for name in ["model.mpk.gz", "tokenizer.json", "config.json", "train_config.json"] {
        assert!(artifact.join(name).exists(), "missing {name}");
    }
    assert!(temp.path().join("results").join("model_epoch_1.mpk.gz").exists());
    assert!(temp.path().join("logs").join("metrics.csv").exists());

    // ── Valid request: one JSON line on stdout ──
    let question = "ما هو ناتج ضرب 5 × 4؟";
    let output   = predict(&artifact, Some(&format!(r#"{{"text": "  {question}  "}}"#)))
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains(question), "Arabic text must not be escaped: {stdout}");

    let response: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(response["text"], question);
    let prediction = response["prediction"].as_i64().unwrap();
    assert!(prediction == 0 || prediction == 1);

    // ── Invalid requests: one error line on stderr, exit 1 ──
    predict(&artifact, Some(r#"{"text": ""}"#))
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("{\"error\":"));

    predict(&artifact, Some("not-json"))
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to parse request JSON"));

    predict(&artifact, Some("-1"))
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid request"));

    predict(&artifact, None)
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no request received"));
}

#[test]
fn test_artifact_dir_from_env() {
    let temp     = TempDir::new().unwrap();
    let artifact = train_tiny(temp.path());

    bin()
        .env(ARTIFACT_ENV, &artifact)
        .args(["predict", r#"{"text": "اذكر عاصمة فرنسا."}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"prediction\":"));
}
