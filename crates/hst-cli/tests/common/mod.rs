//! Shared harness for hst command-line tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

/// Captured output of one `hst` run.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn ok(self) -> Self {
        assert_eq!(
            self.exit_code, 0,
            "command failed\nstdout:\n{}\nstderr:\n{}",
            self.stdout, self.stderr
        );
        self
    }
}

/// Run the hst binary in `dir` with a pinned environment.
pub fn hst(dir: &Path, args: &[&str]) -> CommandResult {
    let output = Command::new(env!("CARGO_BIN_EXE_hst"))
        .args(args)
        .current_dir(dir)
        .env("USER", "tester")
        .env("TZ", "UTC")
        .env_remove("HST_LOG")
        .output()
        .expect("failed to run hst");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

pub fn write(dir: &Path, path: &str, data: &str) {
    let full = dir.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full, data).unwrap();
}

pub fn read(dir: &Path, path: &str) -> String {
    std::fs::read_to_string(dir.join(path)).unwrap()
}

/// `hst init` in a fresh subdirectory `name` of `root`.
pub fn init_repo(root: &Path, name: &str) -> std::path::PathBuf {
    let dir = root.join(name);
    hst(root, &["init", name]).ok();
    dir
}

/// Write, stage and commit one file; returns the new commit id.
pub fn commit_file(dir: &Path, path: &str, data: &str, message: &str) -> String {
    write(dir, path, data);
    hst(dir, &["add", path]).ok();
    hst(dir, &["commit", "-m", message]).ok();
    hst(dir, &["rev-parse", "HEAD"]).ok().stdout.trim().to_string()
}
