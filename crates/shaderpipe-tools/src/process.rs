//! Running external tool executables.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use shaderpipe_core::ToolError;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Captured result of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Everything the process printed, stdout first.
    pub fn diagnostics(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }

    /// Turn a non-zero exit into [`ToolError::Failed`].
    pub fn check(self) -> Result<Self, ToolError> {
        if self.success() {
            return Ok(self);
        }

        let mut diagnostics = self.diagnostics();
        if diagnostics.is_empty() {
            diagnostics = match self.exit_code {
                Some(code) => format!("process exited with code {code}"),
                None => "process terminated by signal".to_string(),
            };
        }
        Err(ToolError::Failed {
            exit_code: self.exit_code,
            diagnostics,
        })
    }
}

/// Spawns tool executables with a timeout.
///
/// Children are killed if the run future is dropped or the timeout expires.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args` inside `cwd` and capture its output.
    ///
    /// A non-zero exit is *not* an error here; callers decide with
    /// [`ProcessOutput::check`].
    pub async fn run<I, S>(&self, program: &Path, args: I, cwd: &Path) -> Result<ProcessOutput, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program_name = program.display().to_string();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let child = cmd.spawn().map_err(|source| ToolError::Spawn {
            program: program_name.clone(),
            source,
        })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ToolError::Io(e)),
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: program_name,
                    timeout: self.timeout,
                });
            }
        };

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            program = %program_name,
            exit_code = ?result.exit_code,
            elapsed = ?start.elapsed(),
            "Process finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: Option<i32>, stdout: &str, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn test_diagnostics_joins_streams() {
        assert_eq!(output(Some(1), "a\n", "b\n").diagnostics(), "a\nb");
        assert_eq!(output(Some(1), "", "b\n").diagnostics(), "b");
        assert_eq!(output(Some(1), "a", "").diagnostics(), "a");
        assert_eq!(output(Some(1), "", "").diagnostics(), "");
    }

    #[test]
    fn test_check_success() {
        assert!(output(Some(0), "ok", "").check().is_ok());
    }

    #[test]
    fn test_check_failure_keeps_raw_text() {
        let err = output(Some(1), "", "error X3000: syntax error\n").check().unwrap_err();
        match err {
            ToolError::Failed {
                exit_code,
                diagnostics,
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(diagnostics, "error X3000: syntax error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_failure_without_output() {
        let err = output(Some(3), "", "").check().unwrap_err();
        assert_eq!(err.diagnostics(), "process exited with code 3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::default();
        let out = runner
            .run(
                Path::new("sh"),
                ["-c", "echo out; echo err >&2; exit 2"],
                dir.path(),
            )
            .await
            .unwrap();

        assert_eq!(out.exit_code, Some(2));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let out = ProcessRunner::default()
            .run(Path::new("sh"), ["-c", "cat marker.txt"], dir.path())
            .await
            .unwrap();
        assert_eq!(out.stdout, "here");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let err = runner
            .run(Path::new("sh"), ["-c", "sleep 5"], dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessRunner::default()
            .run(
                Path::new("shaderpipe-no-such-tool"),
                std::iter::empty::<&str>(),
                dir.path(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { ref program, .. } if program == "shaderpipe-no-such-tool"));
    }
}
