//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tf_core::{Error, Result};
use tokio::process::Command;

/// Default command timeout: 30 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Diagnostics longer than this keep only their tail.
const MAX_DIAGNOSTIC_BYTES: usize = 4096;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// The child process is killed when the returned future is dropped or the
/// timeout elapses.
///
/// # Example
///
/// ```no_run
/// use tf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> tf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-hide_banner")
///     .arg("-version")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::EncoderUnavailable`] if the process cannot be spawned.
    /// - [`Error::EncodingFailed`] if it exits non-zero (carrying the tail of
    ///   stderr) or does not finish within the timeout.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::encoder_unavailable(&program_name, format!("failed to spawn: {e}"))
        })?;

        tracing::debug!(tool = %program_name, args = ?self.args, "spawned tool");

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::encoding_failed(
                    program_name,
                    format!("I/O error waiting for process: {e}"),
                ));
            }
            Err(_elapsed) => {
                return Err(Error::encoding_failed(
                    program_name,
                    format!("timed out after {:?}", self.timeout),
                ));
            }
        };

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::encoding_failed(
                program_name,
                format!(
                    "exited with {}: {}",
                    output.status,
                    tail(tool_output.stderr.trim(), MAX_DIAGNOSTIC_BYTES)
                ),
            ));
        }

        Ok(tool_output)
    }
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
