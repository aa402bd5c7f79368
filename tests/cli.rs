#![cfg(unix)]

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const OUTDATED: &str = r#"{
  "formulae": [
    {"name": "gping", "installed_versions": ["1.15.1"], "current_version": "1.16.0", "pinned": false, "pinned_version": null}
  ],
  "casks": [
    {"name": "arq", "installed_versions": ["7.25"], "current_version": "7.26.1"}
  ]
}"#;

const NO_UPDATES: &str = r#"{"formulae": [], "casks": []}"#;

/// A stand-in for `brew` that answers from fixture files and logs every call.
const FAKE_BREW: &str = r#"#!/bin/sh
here="$(dirname "$0")"
echo "$*" >> "$here/calls.log"
case "$1" in
  update) echo "Already up-to-date." ;;
  outdated) cat "$here/outdated.json" ;;
  info)
    for last; do :; done
    printf '{"formulae": [{"name": "%s", "full_name": "%s", "desc": "%s from the fake tap"}], "casks": [{"token": "%s", "desc": "%s from the fake tap"}]}\n' \
      "$last" "$last" "$last" "$last" "$last"
    ;;
  leaves) echo "gping" ;;
  uses) ;;
  *) ;;
esac
"#;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(outdated: &str, excludes: &[&str]) -> Self {
        let dir = tempdir().unwrap();
        let brew = dir.path().join("brew");
        fs::write(&brew, FAKE_BREW).unwrap();
        fs::set_permissions(&brew, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join("outdated.json"), outdated).unwrap();

        let excludes = excludes
            .iter()
            .map(|e| format!("\"{e}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let config = format!(
            "homebrew_command = \"{}\"\nexclude_updades = [{}]\n",
            brew.display(),
            excludes
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();

        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn calls(&self) -> String {
        fs::read_to_string(self.dir.path().join("calls.log")).unwrap_or_default()
    }

    fn brewup(&self) -> Command {
        brewup_with_config(&self.config_path())
    }
}

fn brewup_with_config(config: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("brewup"));
    cmd.env("BREWUP_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flag() {
    Command::new(cargo::cargo_bin!("brewup"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("brewup"));
}

#[test]
fn test_list_shows_available_updates() {
    let sandbox = Sandbox::new(OUTDATED, &["arq"]);

    sandbox
        .brewup()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Updates"))
        .stdout(predicate::str::contains("gping"))
        .stdout(predicate::str::contains("gping from the fake tap"))
        .stdout(predicate::str::contains("1.16.0"))
        .stdout(predicate::str::contains("arq").not());

    let calls = sandbox.calls();
    assert!(calls.starts_with("update\n"));
    assert!(calls.contains("outdated --json=v2"));
    assert!(!calls.contains("upgrade"));
}

#[test]
fn test_list_excluded_shows_only_excluded() {
    let sandbox = Sandbox::new(OUTDATED, &["arq"]);

    sandbox
        .brewup()
        .args(["--list", "--excluded"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updates excluded by config"))
        .stdout(predicate::str::contains("arq"))
        .stdout(predicate::str::contains("gping").not());
}

#[test]
fn test_no_updates_available() {
    let sandbox = Sandbox::new(NO_UPDATES, &[]);

    sandbox
        .brewup()
        .assert()
        .success()
        .stdout(predicate::str::contains("No updates available"));

    let calls = sandbox.calls();
    assert!(!calls.contains("upgrade"));
    assert!(!calls.contains("cleanup"));
}

#[test]
fn test_dry_run_upgrade() {
    let sandbox = Sandbox::new(OUTDATED, &[]);

    sandbox.brewup().arg("--dry-run").assert().success();

    let calls = sandbox.calls();
    assert!(calls.contains("upgrade --formulae --dry-run gping"));
    assert!(calls.contains("upgrade --casks --dry-run arq"));
    assert!(calls.contains("autoremove --dry-run"));
    assert!(calls.contains("cleanup --dry-run"));
}

#[test]
fn test_info_prints_details() {
    let sandbox = Sandbox::new(OUTDATED, &[]);

    sandbox
        .brewup()
        .args(["--info", "gping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gping from the fake tap"));

    assert!(!sandbox.calls().contains("update"));
}

#[test]
fn test_missing_homebrew_command_is_reported() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        "homebrew_command = \"/nonexistent/brewup-test/brew\"\n",
    )
    .unwrap();

    brewup_with_config(&config)
        .arg("--list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available in the PATH"));
}

#[test]
fn test_failure_is_written_to_log_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "homebrew_command = \"/nonexistent/brewup-test/brew\"\n").unwrap();
    let log = dir.path().join("logs").join("brewup.log");

    let output = brewup_with_config(&config)
        .args(["-v", "--list", "--log-to-file", "--log-file"])
        .arg(&log)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("not available in the PATH").count(), 1);

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("ERROR"));
    assert!(content.contains("not available in the PATH"));
}

#[test]
fn test_log_file_without_log_to_file_is_ignored() {
    let sandbox = Sandbox::new(NO_UPDATES, &[]);
    let log = sandbox.dir.path().join("unused.log");

    sandbox
        .brewup()
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success();

    assert!(!log.exists());
}

#[test]
fn test_all_and_excluded_together() {
    let sandbox = Sandbox::new(OUTDATED, &["arq"]);

    sandbox
        .brewup()
        .args(["--list", "--all", "--excluded"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gping"))
        .stdout(predicate::str::contains("arq"));
}

#[test]
fn test_default_config_is_created() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    // The default file points at `brew`, which may be absent; only its creation matters here.
    let _ = brewup_with_config(&config).arg("--list").assert();

    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("homebrew_command = \"brew\""));
}
