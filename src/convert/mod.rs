//! The conversion pipeline.
//!
//! A run checks the source's type marker, extracts it into a temporary
//! directory, resolves the root packages and, for each package, plans,
//! renders and packages its pages. Every temporary directory belongs to a
//! [`Workspace`] that is released when the run ends, however it ends.
//!
//! # Example
//!
//! ```no_run
//! use epub2cbz::convert::{ConvertOptions, Converter};
//! use epub2cbz::tools::Toolkit;
//! use std::path::Path;
//!
//! fn main() -> epub2cbz::Result<()> {
//!     let converter = Converter::new(Toolkit::default(), ConvertOptions::new());
//!     let report = converter.convert(Path::new("book.epub"))?;
//!     for archive in &report.archives {
//!         println!("{}", archive.path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod naming;
mod package;
mod plan;
mod render;
mod workspace;

pub use naming::{archive_file_name, source_base_name, ARCHIVE_EXTENSION};
pub use package::ArchivePackager;
pub use plan::{ConversionPlan, PackagePlan};
pub use render::PageRenderer;
pub use workspace::Workspace;

use crate::detect::check_mimetype;
use crate::error::{Error, Result};
use crate::model::{Container, Dimension, RootPackage};
use crate::parser::{parse_container, ParseOptions};
use crate::tools::{CancellationToken, Toolkit};
use crossbeam_channel::Sender;
use plan::{plan_package, PlanContext};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory for output archives and temporary directories
    /// (`None` = the current directory)
    pub output_dir: Option<PathBuf>,

    /// Parsing options
    pub parse: ParseOptions,

    /// Whether to probe and render pages concurrently
    pub parallel: bool,

    /// Worker count for concurrent work (`None` = available parallelism)
    pub jobs: Option<usize>,

    /// Extra rasterizer attempts per page before the package fails
    pub render_retries: u32,

    /// Continue with the remaining root packages when one fails
    pub keep_going: bool,

    /// Cancellation signal for the run
    pub cancel: CancellationToken,

    /// Receiver side gets a [`ProgressEvent`] per milestone
    pub progress: Option<Sender<ProgressEvent>>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Enable lenient parsing.
    pub fn lenient(mut self) -> Self {
        self.parse = self.parse.lenient();
        self
    }

    /// Enable or disable concurrent work.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable concurrent work.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the worker count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Set the number of extra rasterizer attempts per page.
    pub fn with_render_retries(mut self, retries: u32) -> Self {
        self.render_retries = retries;
        self
    }

    /// Continue with other root packages after a failure.
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Use `cancel` as the run's cancellation signal.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            parse: ParseOptions::default(),
            parallel: true,
            jobs: None,
            render_retries: 0,
            keep_going: true,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }
}

/// Milestones reported while a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A root package has been planned and is about to render.
    PackageStarted {
        package: usize,
        packages: usize,
        name: String,
        pages: usize,
        canonical: Dimension,
    },
    /// A page has been rendered.
    PageRendered {
        package: usize,
        page: usize,
        total: usize,
    },
    /// A package's archive has been written.
    PackageFinished { package: usize, archive: PathBuf },
    /// A package failed and produced no archive.
    PackageFailed { package: usize, message: String },
}

/// An archive produced by a run.
#[derive(Debug, Clone, Serialize)]
pub struct OutputArchive {
    /// 1-based root package position
    pub package: usize,

    /// Location of the archive
    pub path: PathBuf,

    /// Number of pages in the archive
    pub pages: usize,

    /// Canonical page size of the package
    pub canonical: Dimension,
}

/// A root package that produced no archive.
#[derive(Debug)]
pub struct PackageFailure {
    /// 1-based root package position
    pub package: usize,

    /// The package's `full-path`
    pub full_path: String,

    /// Why it failed
    pub error: Error,
}

/// Result of a run.
#[derive(Debug)]
pub struct ConvertReport {
    /// The source EPUB
    pub source: PathBuf,

    /// Archives written, in root package order
    pub archives: Vec<OutputArchive>,

    /// Packages that failed (only with several root packages and keep-going)
    pub failures: Vec<PackageFailure>,
}

impl ConvertReport {
    /// Check if every root package produced an archive.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total pages written across all archives.
    pub fn total_pages(&self) -> usize {
        self.archives.iter().map(|a| a.pages).sum()
    }
}

/// Converts fixed-layout EPUB files into CBZ archives.
pub struct Converter {
    toolkit: Toolkit,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the given collaborators and options.
    pub fn new(toolkit: Toolkit, options: ConvertOptions) -> Self {
        Self { toolkit, options }
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get the toolkit.
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// Convert `source`, writing one archive per root package.
    ///
    /// With a single root package any failure is returned as the error.
    /// With several, failed packages are recorded in the report (unless
    /// keep-going is off) and the others still convert. Temporary
    /// directories are removed before this returns.
    pub fn convert(&self, source: &Path) -> Result<ConvertReport> {
        let output_dir = self.prepare(source)?;
        let mut workspace = Workspace::new();

        let result = self.with_pool(|| self.run(source, &output_dir, &mut workspace));
        finish(result, &mut workspace)
    }

    /// Plan every root package of `source` without rendering anything.
    ///
    /// Paths in the plan point into the extraction directory, which is
    /// removed before this returns.
    pub fn plan(&self, source: &Path) -> Result<ConversionPlan> {
        let output_dir = self.prepare(source)?;
        let mut workspace = Workspace::new();

        let result = self.with_pool(|| {
            let container = self.extract(source, &output_dir, &mut workspace)?;
            let base = source_base_name(source);
            let packages = container
                .packages
                .iter()
                .map(|package| {
                    let name = archive_file_name(
                        &base,
                        package.index,
                        container.has_multiple_packages(),
                    );
                    plan_package(&self.plan_context(&container), package, name)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ConversionPlan {
                source: source.to_path_buf(),
                packages,
            })
        });
        finish(result, &mut workspace)
    }

    /// Check the type marker and resolve the output directory. Nothing is
    /// created on disk if the marker is wrong.
    fn prepare(&self, source: &Path) -> Result<PathBuf> {
        let marker = self.toolkit.archiver.read_marker(source)?;
        check_mimetype(&marker)?;

        let output_dir = match &self.options.output_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir()?,
        };
        fs::create_dir_all(&output_dir)?;
        Ok(fs::canonicalize(&output_dir)?)
    }

    fn with_pool<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        if !self.options.parallel {
            return f();
        }
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.options.jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder
            .build()
            .map_err(|e| Error::Other(format!("failed to start worker pool: {}", e)))?;
        pool.install(f)
    }

    fn extract(
        &self,
        source: &Path,
        output_dir: &Path,
        workspace: &mut Workspace,
    ) -> Result<Container> {
        let base = source_base_name(source);
        let extract_dir =
            workspace.create_dir(output_dir, &format!("{}_conversiontemp_epub", base))?;
        self.toolkit.archiver.extract(source, &extract_dir)?;
        parse_container(&extract_dir)
    }

    fn plan_context<'a>(&'a self, container: &'a Container) -> PlanContext<'a> {
        PlanContext {
            root: &container.root,
            probe: self.toolkit.probe.as_ref(),
            parse: &self.options.parse,
            cancel: &self.options.cancel,
            parallel: self.options.parallel,
        }
    }

    fn run(
        &self,
        source: &Path,
        output_dir: &Path,
        workspace: &mut Workspace,
    ) -> Result<ConvertReport> {
        let container = self.extract(source, output_dir, workspace)?;
        let multiple = container.has_multiple_packages();
        if multiple {
            log::info!(
                "Multiple rootfiles detected ({})",
                container.packages.len()
            );
        }

        let base = source_base_name(source);
        let mut report = ConvertReport {
            source: source.to_path_buf(),
            archives: Vec::new(),
            failures: Vec::new(),
        };

        for package in &container.packages {
            if self.options.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let name = archive_file_name(&base, package.index, multiple);
            let result = self.convert_package(&container, package, name, output_dir, workspace);
            match result {
                Ok(archive) => {
                    self.emit(ProgressEvent::PackageFinished {
                        package: package.index,
                        archive: archive.path.clone(),
                    });
                    report.archives.push(archive);
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) if !multiple || !self.options.keep_going => return Err(e),
                Err(e) => {
                    log::error!("Root package {} failed: {}", package.full_path, e);
                    self.emit(ProgressEvent::PackageFailed {
                        package: package.index,
                        message: e.to_string(),
                    });
                    report.failures.push(PackageFailure {
                        package: package.index,
                        full_path: package.full_path.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(report)
    }

    fn convert_package(
        &self,
        container: &Container,
        package: &RootPackage,
        name: String,
        output_dir: &Path,
        workspace: &mut Workspace,
    ) -> Result<OutputArchive> {
        log::info!("Starting rootfile {}", package.full_path);
        let plan = plan_package(&self.plan_context(container), package, name)?;

        let stem = plan
            .archive_name
            .trim_end_matches(&format!(".{}", ARCHIVE_EXTENSION))
            .to_string();
        let pages_dir = workspace.create_dir(output_dir, &format!("{}_conversiontemp_cbz", stem))?;
        let scratch = workspace.create_dir(output_dir, &format!("{}_conversiontemp_render", stem))?;

        self.emit(ProgressEvent::PackageStarted {
            package: package.index,
            packages: container.packages.len(),
            name: plan.archive_name.clone(),
            pages: plan.page_count(),
            canonical: plan.canonical,
        });

        let renderer = PageRenderer::new(self.toolkit.rasterizer.clone(), package.index)
            .with_retries(self.options.render_retries)
            .with_cancellation(self.options.cancel.clone())
            .with_progress(self.options.progress.clone());
        let rendered = renderer.render_all(&plan.pages, &pages_dir, &scratch, self.options.parallel)?;

        let packager = ArchivePackager::new(self.toolkit.archiver.clone());
        let path = packager.package(&pages_dir, &output_dir.join(&plan.archive_name))?;

        Ok(OutputArchive {
            package: package.index,
            path,
            pages: rendered.len(),
            canonical: plan.canonical,
        })
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.options.progress {
            let _ = progress.send(event);
        }
    }
}

/// Release the workspace and merge cleanup failures into the run result.
fn finish<T>(result: Result<T>, workspace: &mut Workspace) -> Result<T> {
    let cleanup = workspace.release();
    match (result, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            log::error!("Cleanup after failure also failed: {}", cleanup);
            Err(e)
        }
    }
}
