//! End-to-end tests for the gridlens binary
//!
//! These tests build and invoke the binary through cargo and are gated
//! behind the `integration` feature flag. Run with:
//!
//! ```sh
//! cargo test -p gridlens-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::Command;

const TABLE: &str = "name,agent_type,agent_start_position,tree_visibility,tree_rewards,tree_positions,best_path,path_reached_reward_goal,path_true_reward
trial_1,optimist,\"(10, 1)\",\"[0, 1]\",\"[4, 2]\",\"[(9, 1), (1, 9)]\",\"[(10, 1), (9, 1)]\",True,4
";

fn gridlens(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "gridlens-cli", "--"])
        .args(args)
        .env("GRIDLENS_PROJECT_CONFIG_DIR", dir.join("project"))
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .output()
        .expect("Failed to run gridlens")
}

/// Test that gridlens --help works
#[test]
fn gridlens_help_works() {
    let dir = tempfile::tempdir().unwrap();
    let output = gridlens(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Counterfactual trait/start attribution"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("trial"));
    assert!(stdout.contains("config"));
}

/// Test that gridlens config show prints defaults without config files
#[test]
fn gridlens_config_show_works_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = gridlens(dir.path(), &["config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[model]"));
    assert!(stdout.contains("discount_factor = 0.9"));
}

/// Test that a run over a missing trial exits with failure
#[test]
fn gridlens_run_missing_trial_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("summary.csv");
    let output_path = dir.path().join("out.csv");
    std::fs::write(&input, TABLE).unwrap();

    let output = gridlens(
        dir.path(),
        &[
            "run",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
            "--trial",
            "trial_404",
        ],
    );

    assert!(!output.status.success());
    assert!(!output_path.exists());
}

/// Test that gridlens trial --json emits the breakdown
#[test]
fn gridlens_trial_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("summary.csv");
    std::fs::write(&input, TABLE).unwrap();

    let output = gridlens(
        dir.path(),
        &["trial", "trial_1", "--input", input.to_str().unwrap(), "--json"],
    );

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["trial_name"], "trial_1");
    assert_eq!(value["counterfactuals"]["start_cf"], serde_json::json!([1, 10]));
}
