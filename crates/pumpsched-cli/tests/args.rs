//! CLI argument-surface tests: `--inp` is required, the rest carry their
//! own defaults (`--hmax 24`, `--max-actuations 3`, one worker). Spawns
//! the built binary directly, the way `utf8proj-cli`'s own
//! `tests/init_command.rs` does, rather than linking against a library
//! target (this crate exposes none).

use std::path::PathBuf;
use std::process::Command;

use tempfile::NamedTempFile;

fn pumpsched_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target/debug/pumpsched")
}

#[test]
fn missing_inp_argument_is_a_parse_error() {
    let output = Command::new(pumpsched_binary())
        .output()
        .expect("failed to execute pumpsched");

    assert!(!output.status.success(), "missing --inp must fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--inp") || stderr.contains("required"),
        "stderr should mention the missing required flag, got: {stderr}"
    );
}

#[test]
fn unreadable_inp_path_fails_with_a_reported_error_not_a_panic() {
    // A path that does not exist is enough to exercise the open-failure
    // path (a missing network file is fatal at startup) without needing a
    // real, hydraulically valid network to hand the EPANET toolkit.
    let missing = NamedTempFile::new().expect("tempfile").path().to_path_buf();
    std::fs::remove_file(&missing).ok();

    let output = Command::new(pumpsched_binary())
        .args(["--inp"])
        .arg(&missing)
        .output()
        .expect("failed to execute pumpsched");

    assert!(!output.status.success(), "a missing .inp file must not report success");
}
