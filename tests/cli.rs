//! End-to-end CLI tests driving the real binary against a scratch project directory.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serial_test::serial;

fn erasmus() -> Command {
    Command::cargo_bin("erasmus").unwrap()
}

#[test]
#[serial]
fn setup_creates_rules_file_and_selects_standard_protocol() {
    let project = assert_fs::TempDir::new().unwrap();

    erasmus()
        .current_dir(&project)
        .env("IDE_ENV", "claude")
        .arg("setup")
        .assert()
        .success();

    project.child("CLAUDE.md").assert(predicate::path::is_file());
    project.child(".erasmus/current_protocol.txt").assert(predicate::str::contains("standard"));
    project.child(".erasmus/context/default").assert(predicate::path::is_dir());
}

#[test]
#[serial]
fn context_list_is_empty_before_setup() {
    let project = assert_fs::TempDir::new().unwrap();

    erasmus()
        .current_dir(&project)
        .env("IDE_ENV", "codex")
        .args(["context", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
#[serial]
fn protocol_list_includes_builtin_standard_without_setup() {
    let project = assert_fs::TempDir::new().unwrap();

    erasmus()
        .current_dir(&project)
        .env("IDE_ENV", "cursor")
        .args(["protocol", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standard"));
}

#[test]
#[serial]
fn missing_ide_env_without_dotenv_fails_with_config_missing() {
    let project = assert_fs::TempDir::new().unwrap();

    erasmus()
        .current_dir(&project)
        .env_remove("IDE_ENV")
        .args(["context", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("run `erasmus setup`"));
}

#[test]
#[serial]
fn s2_end_to_end_merge_through_context_store_and_load() {
    let project = assert_fs::TempDir::new().unwrap();

    erasmus().current_dir(&project).env("IDE_ENV", "claude").arg("setup").assert().success();

    std::fs::write(
        project.path().join(".ctx.architecture.xml"),
        "<Architecture><Title>Widget Factory</Title></Architecture>",
    )
    .unwrap();

    erasmus()
        .current_dir(&project)
        .env("IDE_ENV", "claude")
        .args(["context", "store"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget_Factory"));

    erasmus()
        .current_dir(&project)
        .env("IDE_ENV", "claude")
        .args(["context", "load", "Widget_Factory"])
        .assert()
        .success();

    let rules = std::fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
    assert!(rules.contains("Widget Factory"));
    // Confirms the real merge template (not the plain-concatenation fallback) was used: the
    // template's wrapping element and the selected protocol's body both survive substitution.
    assert!(rules.contains("<Rules>"));
    assert!(rules.contains("<Name>standard</Name>"));
    assert!(!rules.contains("<!--ARCHITECTURE-->"));
}
