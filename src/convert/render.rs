//! Page rasterization orchestration.

use super::ProgressEvent;
use crate::error::{Error, Result};
use crate::model::{PagePlan, RenderedPage};
use crate::tools::{CancellationToken, RasterRequest, Rasterizer};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Drives the rasterizer over a package's pages.
pub struct PageRenderer {
    rasterizer: Arc<dyn Rasterizer>,
    retries: u32,
    cancel: CancellationToken,
    progress: Option<Sender<ProgressEvent>>,
    package: usize,
}

impl PageRenderer {
    /// Create a renderer for the package at 1-based position `package`.
    pub fn new(rasterizer: Arc<dyn Rasterizer>, package: usize) -> Self {
        Self {
            rasterizer,
            retries: 0,
            cancel: CancellationToken::new(),
            progress: None,
            package,
        }
    }

    /// Re-run a failed page up to `retries` more times.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Stop when `cancel` is tripped.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report each finished page on `progress`.
    pub fn with_progress(mut self, progress: Option<Sender<ProgressEvent>>) -> Self {
        self.progress = progress;
        self
    }

    /// Render every page into `out_dir`, one invocation per page.
    ///
    /// Each invocation gets its own directory under `scratch`. With
    /// `parallel` set, pages render concurrently on the current rayon pool;
    /// the returned pages are always in plan order. The first failure
    /// aborts the package.
    pub fn render_all(
        &self,
        pages: &[PagePlan],
        out_dir: &Path,
        scratch: &Path,
        parallel: bool,
    ) -> Result<Vec<RenderedPage>> {
        let total = pages.len();
        if parallel {
            pages
                .par_iter()
                .map(|plan| self.render_page(plan, out_dir, scratch, total))
                .collect()
        } else {
            pages
                .iter()
                .map(|plan| self.render_page(plan, out_dir, scratch, total))
                .collect()
        }
    }

    /// Render one page and move its image to `out_dir`.
    pub fn render_page(
        &self,
        plan: &PagePlan,
        out_dir: &Path,
        scratch: &Path,
        total: usize,
    ) -> Result<RenderedPage> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let index = plan.entry.index;
        let work_dir = scratch.join(format!("page_{:05}", index));
        fs::create_dir_all(&work_dir)?;

        let request = RasterRequest {
            page: index,
            document: &plan.entry.path,
            window: plan.window,
            scale: plan.scale,
            work_dir: &work_dir,
        };

        log::info!(
            "Rendering page {} using scale {} ({} -> {})",
            plan.output_name(),
            plan.scale,
            plan.window,
            plan.output_size()
        );

        let produced = self.rasterize_with_retry(&request)?;
        if !produced.is_file() {
            return Err(Error::Render {
                page: index,
                path: plan.entry.path.clone(),
                reason: format!("no output file at {}", produced.display()),
            });
        }

        let dest = out_dir.join(plan.output_name());
        move_file(&produced, &dest)?;

        if let Err(e) = fs::remove_dir_all(&work_dir) {
            log::debug!("Leaving {} for workspace cleanup: {}", work_dir.display(), e);
        }

        if let Some(progress) = &self.progress {
            let _ = progress.send(ProgressEvent::PageRendered {
                package: self.package,
                page: index,
                total,
            });
        }

        Ok(RenderedPage {
            index,
            path: dest,
        })
    }

    fn rasterize_with_retry(&self, request: &RasterRequest<'_>) -> Result<std::path::PathBuf> {
        let mut attempt = 0;
        loop {
            match self.rasterizer.rasterize(request, &self.cancel) {
                Ok(path) => return Ok(path),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!("{}; retrying ({}/{})", e, attempt, self.retries);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
