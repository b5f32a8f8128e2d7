//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn faroetest(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("faroetest").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn repo_data_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn validate_repo_fixtures() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("validate")
        .arg("--data-dir")
        .arg(repo_data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Grammar Rule Application: 7 cases"))
        .stdout(predicate::str::contains("Morphological Understanding: 5 cases"))
        .stdout(predicate::str::contains("Translation Accuracy: 6 cases"))
        .stdout(predicate::str::contains("All test cases valid"));
}

#[test]
fn validate_reports_warnings() {
    let home = TempDir::new().unwrap();
    let data = home.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("test_grammar_rules.json"),
        r#"{"grammar_rule_application": [{"question": "q", "system_prompt": "s", "expected_answer": ""}]}"#,
    )
    .unwrap();
    std::fs::write(
        data.join("test_morphological_understanding.json"),
        r#"{"morphological_understanding": []}"#,
    )
    .unwrap();
    std::fs::write(
        data.join("test_translation_accuracy.json"),
        r#"{"translation_accuracy": [{"question": "Translate 'Hey'", "system_prompt": "s", "expected_answer": "Hello"}]}"#,
    )
    .unwrap();

    faroetest(&home)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("expected_answer is empty"))
        .stdout(predicate::str::contains("no test cases"))
        .stdout(predicate::str::contains("has no 'type'"))
        .stdout(predicate::str::contains("3 warning(s) found"));
}

#[test]
fn validate_uses_config_data_dir() {
    let home = TempDir::new().unwrap();
    let fixtures = home.path().join("fixtures");
    std::fs::create_dir_all(&fixtures).unwrap();
    for entry in std::fs::read_dir(repo_data_dir()).unwrap() {
        let path = entry.unwrap().path();
        std::fs::copy(&path, fixtures.join(path.file_name().unwrap())).unwrap();
    }
    std::fs::write(
        home.path().join("faroetest.toml"),
        "data_dir = \"fixtures\"\n",
    )
    .unwrap();

    faroetest(&home)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Translation Accuracy: 6 cases"))
        .stdout(predicate::str::contains("All test cases valid"));
}

#[test]
fn validate_missing_data_dir() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("validate")
        .arg("--data-dir")
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let home = TempDir::new().unwrap();

    faroetest(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created faroetest.toml"))
        .stdout(predicate::str::contains(
            "Created data/test_translation_accuracy.json",
        ));

    assert!(home.path().join("faroetest.toml").exists());
    assert!(home.path().join("data/test_grammar_rules.json").exists());
    assert!(home
        .path()
        .join("data/test_morphological_understanding.json")
        .exists());

    // The written fixtures validate cleanly.
    faroetest(&home)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All test cases valid"));
}

#[test]
fn init_fixtures_match_workspace_data() {
    let home = TempDir::new().unwrap();
    faroetest(&home).arg("init").assert().success();

    for name in [
        "test_grammar_rules.json",
        "test_morphological_understanding.json",
        "test_translation_accuracy.json",
    ] {
        let written = std::fs::read_to_string(home.path().join("data").join(name)).unwrap();
        let source = std::fs::read_to_string(repo_data_dir().join(name)).unwrap();
        assert_eq!(written, source, "{name} differs from the workspace copy");
    }
}

#[test]
fn init_skips_existing() {
    let home = TempDir::new().unwrap();

    faroetest(&home).arg("init").assert().success();

    faroetest(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn run_without_api_key_fails_before_any_test() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("run")
        .arg("--data-dir")
        .arg(repo_data_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    assert!(!home.path().join("results").exists());
}

#[test]
fn run_rejects_unknown_category() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .env("OPENAI_API_KEY", "test-key")
        .arg("run")
        .arg("--category")
        .arg("phonology")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn plot_without_results_fails() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("plot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no results file found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_then_plot_against_fake_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello\n"}}],
            "model": "gpt-4o",
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        })))
        .expect(18)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = home.path().join("faroetest.toml");
    std::fs::write(&config, format!("base_url = \"{}\"\n", server.uri())).unwrap();
    let results = home.path().join("results");

    faroetest(&home)
        .env("OPENAI_API_KEY", "test-key")
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--data-dir")
        .arg(repo_data_dir())
        .arg("--results-dir")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Results:"))
        .stdout(predicate::str::contains(
            "Translation Accuracy:\n  Accuracy: 16.67%\n  Correct: 1/6",
        ))
        .stdout(predicate::str::contains(
            "Grammar Rule Application:\n  Accuracy: 0.00%\n  Correct: 0/7",
        ));

    let written = std::fs::read_dir(&results).unwrap().count();
    assert_eq!(written, 3);

    faroetest(&home)
        .arg("plot")
        .arg("--results-dir")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("16.67%"))
        .stdout(predicate::str::contains("grammar"));

    let svg = std::fs::read_to_string(results.join("accuracy_plot.svg")).unwrap();
    assert!(svg.contains("16.67%"));
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Faroese LLM eval harness"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    faroetest(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("faroetest"));
}
