//! External process execution with timeout and cancellation.
//!
//! Processes run on `tokio::process` under `tokio::time::timeout`, raced
//! against the run's [`CancellationToken`]. The pipeline itself is
//! synchronous, so [`ToolCommand::run`] drives each call on a private
//! current-thread runtime; async callers use [`ToolCommand::execute`].

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

pub use tokio_util::sync::CancellationToken;

/// Errors from running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable could not be found.
    #[error("{program} not found; is it installed and on PATH?")]
    NotFound { program: String },

    /// The process could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{program} exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The process ran past its timeout and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    /// The run was cancelled while the process was running.
    #[error("{program} was cancelled")]
    Cancelled { program: String },

    /// The process output could not be interpreted.
    #[error("unexpected output {output:?}: {reason}")]
    Output { output: String, reason: String },

    /// The process succeeded but did not produce the expected file.
    #[error("no output file at {}", .0.display())]
    NoOutput(PathBuf),
}

impl ToolError {
    /// Whether this error came from a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ToolError::Cancelled { .. })
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.lines().last().unwrap_or(stderr))
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit status
    pub status: ExitStatus,

    /// Standard output (empty when not captured)
    pub stdout: Vec<u8>,

    /// Standard error (empty when not captured)
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Standard output as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error as lossy UTF-8.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// An external command built from an argument list, never a shell string.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    capture: bool,
}

impl ToolCommand {
    /// Create a command for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
            capture: true,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the process in `dir`.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Discard stdout/stderr instead of capturing them.
    pub fn quiet(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Program name for messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Command line for logging.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion and require a successful exit status.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn run(&self, cancel: &CancellationToken) -> Result<ToolOutput, ToolError> {
        let output = self.run_unchecked(cancel)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(ToolError::Failed {
                program: self.program_name(),
                status: output.status,
                stderr: output.stderr_text(),
            })
        }
    }

    /// Run to completion, returning whatever exit status the process had.
    pub fn run_unchecked(&self, cancel: &CancellationToken) -> Result<ToolOutput, ToolError> {
        self.block_on(self.execute(cancel))?
    }

    /// Run the process, killing it on timeout or cancellation.
    pub async fn execute(&self, cancel: &CancellationToken) -> Result<ToolOutput, ToolError> {
        let program = self.program_name();
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled { program });
        }

        log::debug!("Running {}", self.display());

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        if self.capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command.spawn().map_err(|e| spawn_error(&program, e))?;

        // Dropping the output future drops the child, which kills it.
        let finished = async {
            let output = child.wait_with_output();
            let result = match self.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, output).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(ToolError::Timeout {
                            program: program.clone(),
                            timeout,
                        })
                    }
                },
                None => output.await,
            };
            result.map_err(|e| spawn_error(&program, e))
        };

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ToolError::Cancelled {
                    program: program.clone(),
                });
            }
            output = finished => output?,
        };

        Ok(ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> Result<F::Output, ToolError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| spawn_error(&self.program_name(), e))?;
        Ok(runtime.block_on(future))
    }
}

fn spawn_error(program: &str, e: io::Error) -> ToolError {
    match e.kind() {
        io::ErrorKind::NotFound => ToolError::NotFound {
            program: program.to_string(),
        },
        _ => ToolError::Spawn {
            program: program.to_string(),
            source: e,
        },
    }
}
