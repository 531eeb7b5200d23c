/// Smoke tests to verify the binary runs without panicking
use std::process::{Command, Output};

fn arbor(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arbor"))
        .args(args)
        .output()
        .expect("Failed to execute arbor")
}

#[test]
fn binary_shows_help() {
    let output = arbor(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("arbor"), "Help output should mention arbor");
    assert!(stdout.contains("grow"), "Help output should list the grow subcommand");
}

#[test]
fn binary_shows_version() {
    let output = arbor(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = arbor(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn params_prints_json() {
    let output = arbor(&["params", "--score", "600"]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("params output should be JSON");
    assert_eq!(report["stage"], "Ancient");
    assert_eq!(report["parameters"]["iteration_count"], 5);
    assert_eq!(report["parameters"]["leaf_density_target"], 60);
    assert_eq!(report["parameters"]["rule_set_index"], 0);
}

#[test]
fn negative_score_is_a_seed() {
    let output = arbor(&["params", "--score", "-40"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"], 0.0);
    assert_eq!(report["parameters"]["iteration_count"], 0);
}

#[test]
fn expand_reports_length() {
    let output = arbor(&["expand", "--grammar", "X=F[+X][-X]FX, F=FF", "--iterations", "2", "--show"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FF[+F[+X][-X]FX][-F[+X][-X]FX]FFF[+X][-X]FX"));
    assert!(stdout.contains("length: 43"));
}

#[test]
fn bad_grammar_is_an_error() {
    let output = arbor(&["expand", "--grammar", "X=F[+X"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"));
}

#[cfg(target_os = "linux")]
#[test]
fn broken_settings_file_is_reported() {
    let home = std::env::temp_dir().join(format!("arbor-smoke-{}", std::process::id()));
    let dir = home.join("arbor");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[animation\nmin_reveal_ms = ").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_arbor"))
        .args(["params", "--score", "10"])
        .env("XDG_CONFIG_HOME", &home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute arbor");
    std::fs::remove_dir_all(&home).unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARN"), "stderr: {}", stderr);
    assert!(stderr.contains("ignoring settings file"), "stderr: {}", stderr);
}
