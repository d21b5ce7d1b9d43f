//! Headless Chrome page rasterizer.

use super::{CancellationToken, RasterRequest, Rasterizer, ToolCommand, ToolError, ToolOptions};
use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// File headless Chrome writes `--screenshot` output to.
pub const SCREENSHOT_NAME: &str = "screenshot.png";

/// Rasterizes pages with `chrome --headless --screenshot`.
///
/// Every invocation runs in the request's working directory with its own
/// profile there, so concurrent invocations never share a screenshot file
/// or a browser profile.
#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    program: PathBuf,
    timeout: Option<Duration>,
    extra_args: Vec<String>,
}

impl ChromeRasterizer {
    /// Create a rasterizer running `program`.
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
            extra_args: Vec::new(),
        }
    }

    /// Create a rasterizer from tool options.
    pub fn from_options(options: &ToolOptions) -> Self {
        Self {
            program: options.rasterizer.clone(),
            timeout: options.timeout,
            extra_args: options.rasterizer_args.clone(),
        }
    }

    fn command(&self, request: &RasterRequest<'_>, target: &Url) -> ToolCommand {
        ToolCommand::new(&self.program)
            .args(["--headless", "--disable-gpu", "--hide-scrollbars", "--no-first-run"])
            .arg(format!(
                "--user-data-dir={}",
                request.work_dir.join("profile").display()
            ))
            .arg("--screenshot")
            .arg(format!("--force-device-scale-factor={}", request.scale))
            .arg(format!(
                "--window-size={},{}",
                request.window.width, request.window.height
            ))
            .args(self.extra_args.iter())
            .arg(target.as_str())
            .current_dir(request.work_dir)
            .timeout(self.timeout)
            .quiet()
    }
}

impl Default for ChromeRasterizer {
    fn default() -> Self {
        Self::from_options(&ToolOptions::default())
    }
}

impl Rasterizer for ChromeRasterizer {
    fn name(&self) -> &str {
        "chrome"
    }

    fn rasterize(
        &self,
        request: &RasterRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let target = document_url(request.document).ok_or_else(|| Error::Render {
            page: request.page,
            path: request.document.to_path_buf(),
            reason: "path can't be expressed as a file URL".into(),
        })?;

        let screenshot = request.work_dir.join(SCREENSHOT_NAME);
        let result = self.command(request, &target).run(cancel).and_then(|_| {
            if screenshot.is_file() {
                Ok(screenshot)
            } else {
                Err(ToolError::NoOutput(request.work_dir.join(SCREENSHOT_NAME)))
            }
        });

        result.map_err(|e| match e {
            ToolError::Cancelled { .. } => Error::Cancelled,
            other => Error::Render {
                page: request.page,
                path: request.document.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

/// `file://` URL of a page document, resolved against the working
/// directory when relative.
pub fn document_url(path: &Path) -> Option<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().ok()?.join(path)
    };
    Url::from_file_path(absolute).ok()
}
