//! External collaborators of the conversion pipeline.
//!
//! The pipeline never shells out directly; it talks to three capability
//! traits. The default [`Toolkit`] wires them to ImageMagick `identify`,
//! headless Chrome and an in-process zip implementation, and tests swap in
//! deterministic fakes.

mod archive;
mod chrome;
mod identify;
mod options;
mod process;

pub use archive::ZipArchiver;
pub use chrome::{document_url, ChromeRasterizer, SCREENSHOT_NAME};
pub use identify::{parse_probe_output, ImageMagickProbe};
pub use options::{ToolOptions, DEFAULT_TIMEOUT_SECS};
pub use process::{CancellationToken, ToolCommand, ToolError, ToolOutput};

use crate::error::Result;
use crate::model::Dimension;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reports the pixel size of an image file.
pub trait DimensionProbe: Send + Sync {
    /// Get the name of this probe.
    fn name(&self) -> &str;

    /// Probe `image`, failing with [`crate::Error::Probe`].
    fn probe(&self, image: &Path, cancel: &CancellationToken) -> Result<Dimension>;
}

/// One rasterizer invocation.
#[derive(Debug, Clone)]
pub struct RasterRequest<'a> {
    /// Page number the output belongs to (1-indexed)
    pub page: usize,

    /// Local page document to render
    pub document: &'a Path,

    /// Window size
    pub window: Dimension,

    /// Device-scale multiplier
    pub scale: f64,

    /// Private working directory for this invocation
    pub work_dir: &'a Path,
}

/// Renders one page document to one raster image.
pub trait Rasterizer: Send + Sync {
    /// Get the name of this rasterizer.
    fn name(&self) -> &str;

    /// Render the request and return the path of the produced image.
    ///
    /// Fails with [`crate::Error::Render`] if the renderer exits abnormally
    /// or produces nothing.
    fn rasterize(&self, request: &RasterRequest<'_>, cancel: &CancellationToken)
        -> Result<PathBuf>;
}

/// Reads and writes zip containers.
pub trait Archiver: Send + Sync {
    /// Get the name of this archiver.
    fn name(&self) -> &str;

    /// Read the `mimetype` marker without extracting anything.
    fn read_marker(&self, source: &Path) -> Result<String>;

    /// Extract `source` into `dest`, preserving internal paths.
    fn extract(&self, source: &Path, dest: &Path) -> Result<()>;

    /// Create `dest` holding `files` flattened into the archive root, in the
    /// given order.
    fn create(&self, files: &[PathBuf], dest: &Path) -> Result<()>;
}

/// The set of collaborators a conversion runs with.
#[derive(Clone)]
pub struct Toolkit {
    /// Image size probe
    pub probe: Arc<dyn DimensionProbe>,

    /// Page rasterizer
    pub rasterizer: Arc<dyn Rasterizer>,

    /// Archive reader/writer
    pub archiver: Arc<dyn Archiver>,
}

impl Toolkit {
    /// Assemble a toolkit from explicit collaborators.
    pub fn new(
        probe: Arc<dyn DimensionProbe>,
        rasterizer: Arc<dyn Rasterizer>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            probe,
            rasterizer,
            archiver,
        }
    }

    /// The system tools: `identify`, headless Chrome and the zip archiver.
    pub fn system(options: &ToolOptions) -> Self {
        Self::new(
            Arc::new(ImageMagickProbe::from_options(options)),
            Arc::new(ChromeRasterizer::from_options(options)),
            Arc::new(ZipArchiver::new()),
        )
    }

    /// Replace the probe.
    pub fn with_probe(mut self, probe: Arc<dyn DimensionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Replace the archiver.
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::system(&ToolOptions::default())
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("probe", &self.probe.name())
            .field("rasterizer", &self.rasterizer.name())
            .field("archiver", &self.archiver.name())
            .finish()
    }
}
