//! ImageMagick `identify` dimension probe.

use super::{CancellationToken, DimensionProbe, ToolCommand, ToolError, ToolOptions};
use crate::error::{Error, Result};
use crate::model::Dimension;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Probes image sizes with `identify -format %w:%h`.
#[derive(Debug, Clone)]
pub struct ImageMagickProbe {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ImageMagickProbe {
    /// Create a probe running `program`.
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Create a probe from tool options.
    pub fn from_options(options: &ToolOptions) -> Self {
        Self::new(&options.probe, options.timeout)
    }

    fn command(&self, image: &Path) -> ToolCommand {
        // `[0]` selects the first frame so animated images print one size.
        let mut target = image.as_os_str().to_os_string();
        target.push("[0]");
        ToolCommand::new(&self.program)
            .args(["-format", "%w:%h"])
            .arg(target)
            .timeout(self.timeout)
    }
}

impl Default for ImageMagickProbe {
    fn default() -> Self {
        Self::from_options(&ToolOptions::default())
    }
}

impl DimensionProbe for ImageMagickProbe {
    fn name(&self) -> &str {
        "identify"
    }

    fn probe(&self, image: &Path, cancel: &CancellationToken) -> Result<Dimension> {
        let output = self
            .command(image)
            .run(cancel)
            .and_then(|out| parse_probe_output(&out.stdout_text()));

        output.map_err(|e| match e {
            ToolError::Cancelled { .. } => Error::Cancelled,
            other => Error::Probe {
                path: image.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

/// Parse the probe's `"<width>:<height>"` output.
pub fn parse_probe_output(output: &str) -> std::result::Result<Dimension, ToolError> {
    let trimmed = output.trim();
    let invalid = |reason: &str| ToolError::Output {
        output: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let (width, height) = trimmed
        .split_once(':')
        .ok_or_else(|| invalid("expected <width>:<height>"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| invalid("width is not an integer"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| invalid("height is not an integer"))?;

    let size = Dimension::new(width, height);
    if size.is_degenerate() {
        return Err(invalid("image has a zero dimension"));
    }
    Ok(size)
}
