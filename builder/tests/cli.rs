//! CLI tests for `game-builder`.
//!
//! Spawns the binary and checks exit codes and console output for paths that
//! never reach the model.

use std::fs;
use std::process::{Command, Stdio};

use builder::exit_codes;
use builder::io::config::{BuilderConfig, load_config};

fn game_builder() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_game-builder"));
    cmd.env_remove("GEMINI_API_KEY").stdin(Stdio::null());
    cmd
}

#[test]
fn init_writes_config_and_keeps_existing_without_force() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = game_builder()
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("game-builder init");
    assert_eq!(status.code(), Some(exit_codes::OK));
    let path = temp.path().join("game-builder.toml");
    assert_eq!(load_config(&path).expect("load"), BuilderConfig::default());

    fs::write(&path, "[build]\nmax_iterations = 5\n").expect("edit config");
    let status = game_builder()
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("game-builder init again");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load").build.max_iterations, 5);

    let status = game_builder()
        .current_dir(temp.path())
        .args(["init", "--force"])
        .status()
        .expect("game-builder init --force");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load").build.max_iterations, 3);
}

#[test]
fn empty_prompt_exits_cleanly() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = game_builder()
        .current_dir(temp.path())
        .args(["build", "--prompt", "   "])
        .output()
        .expect("game-builder build");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No input provided. Exiting."));
    assert!(!temp.path().join("generated_game").exists());
}

#[test]
fn closed_stdin_is_a_fault() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = game_builder()
        .current_dir(temp.path())
        .arg("build")
        .output()
        .expect("game-builder build");

    assert_eq!(output.status.code(), Some(exit_codes::FAULT));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Goodbye"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input closed"));
    assert!(!temp.path().join("generated_game").exists());
}

#[test]
fn missing_api_key_is_a_fault() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = game_builder()
        .current_dir(temp.path())
        .args(["build", "--prompt", "pong"])
        .output()
        .expect("game-builder build");

    assert_eq!(output.status.code(), Some(exit_codes::FAULT));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GEMINI_API_KEY"));
    assert!(stderr.contains("hint:"));
}

#[test]
fn invalid_config_is_a_fault() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("game-builder.toml"),
        "[llm]\ntemperature = 9.0\n",
    )
    .expect("write config");

    let status = game_builder()
        .current_dir(temp.path())
        .args(["build", "--prompt", "pong"])
        .status()
        .expect("game-builder build");

    assert_eq!(status.code(), Some(exit_codes::FAULT));
}
