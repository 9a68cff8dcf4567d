use assert_cmd::Command;
use predicates::str::contains;
use std::path::PathBuf;

fn sample_model() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/pima-logreg.json")
}

#[test]
fn health_check_with_sample_model() {
    let mut cmd = Command::cargo_bin("disease-risk-cli").unwrap();
    cmd.env("DISEASE_RISK_MODEL_PATH", sample_model())
        .arg("health")
        .assert()
        .success()
        .stdout(contains("Checking model"))
        .stdout(contains("ok: pima-logreg-2024.1 (8 features"));
}

#[test]
fn health_check_fails_for_corrupt_model() {
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    std::fs::write(file.path(), "{\"format_version\": 1}").unwrap();

    let mut cmd = Command::cargo_bin("disease-risk-cli").unwrap();
    cmd.env_remove("DISEASE_RISK_MODEL_PATH")
        .args(["--model", file.path().to_str().unwrap(), "health"])
        .assert()
        .failure()
        .stderr(contains("invalid JSON structure in model artifact"));
}
