use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn landing_form() -> Command {
    let mut cmd = Command::cargo_bin("landing-form").expect("binary built");
    cmd.env_clear();
    cmd
}

#[test]
fn render_text_lists_visible_fields() {
    landing_form()
        .args(["render", "--form"])
        .arg(fixture("landing_form.json"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Form: Request a quote (landing-lead)"))
        .stdout(predicate::str::contains(" - Full name *: "))
        .stdout(predicate::str::contains("[ Send request ]"))
        .stdout(predicate::str::contains("Company").not());
}

#[test]
fn render_json_with_errors_marks_status_invalid() {
    let output = landing_form()
        .args(["render", "--format", "json", "--with-errors", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("invalid_lead.json"))
        .output()
        .expect("run render");
    assert!(output.status.success());

    let ui: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(ui["status"], "invalid");
    assert_eq!(ui["sections"][0]["fields"][2]["error"], "Enter a valid email");
}

#[test]
fn closed_form_shows_only_the_notice() {
    landing_form()
        .env("LANDING_FORM_CLOSED", "true")
        .env("LANDING_CLOSED_NOTICE", "Applications reopen in May.")
        .args(["render", "--form"])
        .arg(fixture("landing_form.json"))
        .assert()
        .success()
        .stdout("Applications reopen in May.\n");

    landing_form()
        .env("LANDING_FORM_CLOSED", "true")
        .args(["render", "--ignore-settings", "--form"])
        .arg(fixture("landing_form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Form: Request a quote"));
}

#[test]
fn validate_accepts_a_complete_lead() {
    landing_form()
        .args(["validate", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("valid_lead.json"))
        .assert()
        .success()
        .stdout("valid\n");
}

#[test]
fn validate_reports_every_invalid_field() {
    landing_form()
        .args(["validate", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("invalid_lead.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("amount: Minimum is 100"))
        .stdout(predicate::str::contains("email: Enter a valid email"))
        .stdout(predicate::str::contains("name: Name is too short"))
        .stdout(predicate::str::contains("terms: I accept the terms is required"))
        .stderr(predicate::str::contains("4 field(s) failed validation"));
}

#[test]
fn validate_json_output_is_machine_readable() {
    let output = landing_form()
        .args(["validate", "--json", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("invalid_lead.json"))
        .output()
        .expect("run validate");
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"]["email"], "Enter a valid email");
    assert!(report["errors"].get("company").is_none());
}

#[test]
fn minimum_threshold_from_environment_tightens_validation() {
    landing_form()
        .env("LANDING_MIN_AMOUNT", "2000")
        .args(["validate", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("valid_lead.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("amount: Minimum is 2000"));
}

#[test]
fn check_summarizes_a_sound_config() {
    landing_form()
        .args(["check", "--form"])
        .arg(fixture("landing_form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "landing-lead: 4 section(s), 10 field(s), 1 paragraph(s)",
        ));
}

#[test]
fn check_rejects_bad_patterns_and_flags_duplicates() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let broken = temp.child("broken.json");
    broken
        .write_str(
            &json!({
                "id": "broken",
                "sections": [{
                    "title": "Main",
                    "fields": [{
                        "type": "input",
                        "name": "code",
                        "validation_rules": [
                            { "kind": "pattern", "pattern": "([a-z", "message": "bad" }
                        ]
                    }]
                }]
            })
            .to_string(),
        )
        .expect("write config");
    landing_form()
        .args(["check", "--form"])
        .arg(broken.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid form config"));

    let aliased = temp.child("aliased.json");
    aliased
        .write_str(
            &json!({
                "id": "aliased",
                "sections": [
                    { "title": "One", "fields": [{ "type": "input", "name": "email" }] },
                    { "title": "Two", "fields": [{ "type": "input", "name": "email" }] }
                ]
            })
            .to_string(),
        )
        .expect("write config");
    landing_form()
        .args(["check", "--form"])
        .arg(aliased.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: field name 'email' is declared more than once"));
}

#[test]
fn submit_fails_fast_without_a_primary_sink() {
    landing_form()
        .args(["submit", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("valid_lead.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("LANDING_PRIMARY_SINK_URL must be set"));
}

#[test]
fn missing_data_file_is_reported() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("nope.json");
    landing_form()
        .args(["validate", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read form data"));
    assert!(fs::metadata(&missing).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_succeeds_when_only_the_secondary_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "saved"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sheet"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let output = landing_form()
        .env("LANDING_PRIMARY_SINK_URL", format!("{}/store", server.uri()))
        .env("LANDING_SECONDARY_SINK_URL", format!("{}/sheet", server.uri()))
        .args(["submit", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("valid_lead.json"))
        .output()
        .expect("run submit");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["success"], true);
    assert_eq!(report["sinks"][0]["message"], "saved");
    assert_eq!(report["diagnostics"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["sinks"][1]["ok"], false);

    let received = server.received_requests().await.expect("recorded requests");
    let stored = received
        .iter()
        .find(|request| request.url.path() == "/store")
        .expect("primary request");
    let body: serde_json::Value = serde_json::from_slice(&stored.body).expect("json body");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["installments"], 3);
    assert!(body["timestamp"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_primary_fails_the_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "This email already applied"
        })))
        .mount(&server)
        .await;

    landing_form()
        .env("LANDING_PRIMARY_SINK_URL", format!("{}/store", server.uri()))
        .args(["submit", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("valid_lead.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("submission failed: This email already applied"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_submission_never_reaches_a_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    landing_form()
        .env("LANDING_PRIMARY_SINK_URL", format!("{}/store", server.uri()))
        .args(["submit", "--form"])
        .arg(fixture("landing_form.json"))
        .arg("--data")
        .arg(fixture("invalid_lead.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing was sent"));
}
