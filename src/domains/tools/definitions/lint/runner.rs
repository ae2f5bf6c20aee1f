//! `ansible-lint` subprocess execution.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domains::tools::ToolError;
use crate::domains::tools::error::truncate_chars;

/// Exit codes meaning the linter ran: 0 is clean, 2 is "violations found".
const SUCCESS_CODES: [i32; 2] = [0, 2];

/// Captured result of one linter run.
#[derive(Debug, Clone)]
pub struct LintOutput {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl LintOutput {
    pub fn is_success(&self) -> bool {
        SUCCESS_CODES.contains(&self.return_code)
    }
}

/// Runs the linter binary with a hard timeout.
#[derive(Debug, Clone)]
pub struct LintRunner {
    binary: String,
    timeout: Duration,
}

impl LintRunner {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Find the executable: a path is used as given, a bare name is looked
    /// up on `PATH`.
    pub fn locate(&self) -> Option<PathBuf> {
        let candidate = Path::new(&self.binary);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(&self.binary))
            .find(|path| path.is_file())
    }

    /// Run with `args` and return whatever the process produced, whatever
    /// its exit code. On timeout the child is killed.
    pub async fn run(&self, args: &[String]) -> Result<LintOutput, ToolError> {
        let program = self.locate().ok_or_else(|| {
            ToolError::subprocess(format!(
                "{} is not installed. Please install it with: pip install ansible-lint",
                self.binary
            ))
        })?;

        debug!(program = %program.display(), ?args, "Running linter");

        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ToolError::subprocess(format!("failed to start {}: {}", program.display(), e))
            })?;

        // Dropping the wait future drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::subprocess(e.to_string()))?,
            Err(_) => {
                warn!("Linter exceeded {:?}, killed", self.timeout);
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
        };

        Ok(LintOutput {
            return_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run and require exit code 0 or 2.
    pub async fn run_checked(&self, args: &[String]) -> Result<LintOutput, ToolError> {
        let output = self.run(args).await?;
        if output.is_success() {
            return Ok(output);
        }
        let detail = if output.stderr.trim().is_empty() {
            &output.stdout
        } else {
            &output.stderr
        };
        Err(ToolError::subprocess(format!(
            "exit code {}: {}",
            output.return_code,
            truncate_chars(detail.trim(), 500)
        )))
    }

    /// Write `content` to a temporary `.yml` file, append its path to `args`
    /// and run. The file is removed when this returns.
    pub async fn run_on_content(
        &self,
        args: &[String],
        content: &str,
    ) -> Result<LintOutput, ToolError> {
        let mut file = tempfile::Builder::new()
            .prefix("ansible-lint-")
            .suffix(".yml")
            .tempfile()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let mut full_args = args.to_vec();
        full_args.push(file.path().to_string_lossy().into_owned());

        self.run_checked(&full_args).await
    }
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Instant;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for the linter.
    pub(crate) fn fake_linter(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("ansible-lint");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_timeout_returns_promptly() {
        let dir = TempDir::new().unwrap();
        let runner = LintRunner::new(fake_linter(&dir, "sleep 30"), Duration::from_secs(1));

        let started = Instant::now();
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout(1)));
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_exit_two_counts_as_success() {
        let dir = TempDir::new().unwrap();
        let runner = LintRunner::new(
            fake_linter(&dir, "echo '[]'; exit 2"),
            Duration::from_secs(10),
        );

        let output = runner.run_checked(&[]).await.unwrap();
        assert_eq!(output.return_code, 2);
        assert_eq!(output.stdout.trim(), "[]");
    }

    #[tokio::test]
    async fn test_other_exit_codes_fail_with_stderr() {
        let dir = TempDir::new().unwrap();
        let runner = LintRunner::new(
            fake_linter(&dir, "echo 'bad option' >&2; exit 5"),
            Duration::from_secs(10),
        );

        let err = runner.run_checked(&[]).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("exit code 5"));
        assert!(text.contains("bad option"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = LintRunner::new(
            "/nonexistent/bin/ansible-lint",
            Duration::from_secs(1),
        );
        let err = runner.run(&[]).await.unwrap_err();
        assert!(err.to_string().contains("not installed"));

        let runner = LintRunner::new("ansible-lint-does-not-exist", Duration::from_secs(1));
        assert!(runner.locate().is_none());
    }

    #[tokio::test]
    async fn test_content_file_is_passed_and_removed() {
        let dir = TempDir::new().unwrap();
        // Print the file argument and its content.
        let runner = LintRunner::new(
            fake_linter(&dir, "for last; do :; done; echo \"$last\"; cat \"$last\""),
            Duration::from_secs(10),
        );

        let output = runner
            .run_on_content(&["--format=json".to_string()], "- hosts: all\n")
            .await
            .unwrap();
        let mut lines = output.stdout.lines();
        let path = lines.next().unwrap().to_string();
        assert!(path.ends_with(".yml"));
        assert_eq!(lines.next(), Some("- hosts: all"));
        assert!(!Path::new(&path).exists());
    }
}
