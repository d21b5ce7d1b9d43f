//! # epub2cbz
//!
//! Convert fixed-layout EPUB books into paginated CBZ comic archives.
//!
//! Every page of a fixed-layout EPUB is an XHTML document laid over a
//! full-page background image. This library infers the page size from the
//! book's images, renders each page with a headless browser at a scale
//! large enough to keep the image's native resolution, and packs the
//! rendered pages into a zip archive named `page_00001.png`, `page_00002.png`
//! and so on.
//!
//! ## Quick Start
//!
//! ```no_run
//! use epub2cbz::convert_file;
//!
//! fn main() -> epub2cbz::Result<()> {
//!     let report = convert_file("book.epub")?;
//!     for archive in &report.archives {
//!         println!("{} ({} pages)", archive.path.display(), archive.pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Size inference**: the most common image size becomes the page size
//! - **Viewport scaling**: small viewports render with a device-scale factor
//! - **Multiple renditions**: one archive per root package
//! - **Parallel processing**: pages probe and render on a Rayon pool
//! - **Pluggable tools**: probe, rasterizer and archiver sit behind traits

pub mod convert;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod tools;

// Re-export commonly used types
pub use convert::{
    ConversionPlan, ConvertOptions, ConvertReport, Converter, OutputArchive, PackageFailure,
    PackagePlan, ProgressEvent,
};
pub use detect::{check_mimetype, is_epub, read_mimetype_from_path, EPUB_MIMETYPE};
pub use error::{Error, Result};
pub use layout::{canonical_size, render_scale, ScalePlan, SizeSurvey};
pub use model::{Container, Dimension, PagePlan, RootPackage};
pub use parser::{ErrorMode, ParseOptions};
pub use tools::{CancellationToken, Toolkit, ToolOptions};

use std::path::{Path, PathBuf};

/// Convert an EPUB file into the current directory using the system tools.
///
/// # Arguments
///
/// * `path` - Path to the EPUB file
///
/// # Example
///
/// ```no_run
/// use epub2cbz::convert_file;
///
/// let report = convert_file("book.epub").unwrap();
/// println!("Pages: {}", report.total_pages());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertReport> {
    Epub2Cbz::new().convert(path)
}

/// Convert an EPUB file with custom options.
///
/// # Example
///
/// ```no_run
/// use epub2cbz::{convert_file_with_options, ConvertOptions};
///
/// let options = ConvertOptions::new()
///     .with_output_dir("./out")
///     .lenient();
/// let report = convert_file_with_options("book.epub", options).unwrap();
/// ```
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ConvertOptions,
) -> Result<ConvertReport> {
    Converter::new(Toolkit::default(), options).convert(path.as_ref())
}

/// Plan a conversion without rendering anything.
///
/// Images are still probed, so `identify` must be available.
///
/// # Example
///
/// ```no_run
/// use epub2cbz::plan_file;
///
/// let plan = plan_file("book.epub").unwrap();
/// for package in &plan.packages {
///     println!("{}: {} pages at {}", package.archive_name, package.page_count(), package.canonical);
/// }
/// ```
pub fn plan_file<P: AsRef<Path>>(path: P) -> Result<ConversionPlan> {
    Epub2Cbz::new().plan(path)
}

/// Builder for converting EPUB books.
///
/// # Example
///
/// ```no_run
/// use epub2cbz::Epub2Cbz;
/// use std::time::Duration;
///
/// let report = Epub2Cbz::new()
///     .with_output_dir("./comics")
///     .with_chrome("chromium")
///     .with_timeout(Duration::from_secs(60))
///     .with_retries(1)
///     .lenient()
///     .convert("book.epub")?;
/// # Ok::<(), epub2cbz::Error>(())
/// ```
pub struct Epub2Cbz {
    convert_options: ConvertOptions,
    tool_options: ToolOptions,
    toolkit: Option<Toolkit>,
}

impl Epub2Cbz {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            convert_options: ConvertOptions::default(),
            tool_options: ToolOptions::default(),
            toolkit: None,
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.convert_options = self.convert_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.convert_options = self.convert_options.sequential();
        self
    }

    /// Set the worker count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.convert_options = self.convert_options.with_jobs(jobs);
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.convert_options = self.convert_options.with_output_dir(dir);
        self
    }

    /// Set the number of extra render attempts per page.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.convert_options = self.convert_options.with_render_retries(retries);
        self
    }

    /// Stop at the first failing root package.
    pub fn fail_fast(mut self) -> Self {
        self.convert_options = self.convert_options.with_keep_going(false);
        self
    }

    /// Use `cancel` to stop the conversion.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.convert_options = self.convert_options.with_cancellation(cancel);
        self
    }

    /// Set the Chrome executable.
    pub fn with_chrome(mut self, program: impl Into<PathBuf>) -> Self {
        self.tool_options = self.tool_options.with_rasterizer(program);
        self
    }

    /// Set the `identify` executable.
    pub fn with_identify(mut self, program: impl Into<PathBuf>) -> Self {
        self.tool_options = self.tool_options.with_probe(program);
        self
    }

    /// Set the timeout for each external tool invocation.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.tool_options = self.tool_options.with_timeout(timeout);
        self
    }

    /// Use a custom toolkit instead of the system tools.
    pub fn with_toolkit(mut self, toolkit: Toolkit) -> Self {
        self.toolkit = Some(toolkit);
        self
    }

    /// Build the converter.
    pub fn build(self) -> Converter {
        let toolkit = self
            .toolkit
            .unwrap_or_else(|| Toolkit::system(&self.tool_options));
        Converter::new(toolkit, self.convert_options)
    }

    /// Convert an EPUB file.
    pub fn convert<P: AsRef<Path>>(self, path: P) -> Result<ConvertReport> {
        self.build().convert(path.as_ref())
    }

    /// Plan the conversion of an EPUB file.
    pub fn plan<P: AsRef<Path>>(self, path: P) -> Result<ConversionPlan> {
        self.build().plan(path.as_ref())
    }
}

impl Default for Epub2Cbz {
    fn default() -> Self {
        Self::new()
    }
}
