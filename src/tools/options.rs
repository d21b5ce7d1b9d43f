//! External tool configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default per-invocation timeout for external tools.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Options for the system tools.
#[derive(Debug, Clone)]
pub struct ToolOptions {
    /// Maximum time a single external invocation may run (`None` = unbounded)
    pub timeout: Option<Duration>,

    /// Chrome/Chromium executable
    pub rasterizer: PathBuf,

    /// ImageMagick `identify` executable
    pub probe: PathBuf,

    /// Extra arguments passed to every rasterizer invocation
    pub rasterizer_args: Vec<String>,
}

impl ToolOptions {
    /// Create new tool options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Remove the per-invocation timeout.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the rasterizer executable.
    pub fn with_rasterizer(mut self, program: impl Into<PathBuf>) -> Self {
        self.rasterizer = program.into();
        self
    }

    /// Set the probe executable.
    pub fn with_probe(mut self, program: impl Into<PathBuf>) -> Self {
        self.probe = program.into();
        self
    }

    /// Add an extra rasterizer argument.
    pub fn with_rasterizer_arg(mut self, arg: impl Into<String>) -> Self {
        self.rasterizer_args.push(arg.into());
        self
    }
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            rasterizer: PathBuf::from("google-chrome"),
            probe: PathBuf::from("identify"),
            rasterizer_args: Vec::new(),
        }
    }
}
