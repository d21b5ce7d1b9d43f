//! Per-package render planning.

use crate::error::{Error, Result};
use crate::layout::{render_scale, SizeSurvey};
use crate::model::{Dimension, ManifestItem, PagePlan, RootPackage, MAX_PAGES};
use crate::parser::{extract_viewport, parse_package, ParseOptions};
use crate::tools::{CancellationToken, DimensionProbe};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Render plan for one root package.
#[derive(Debug, Clone, Serialize)]
pub struct PackagePlan {
    /// The root package this plan belongs to
    pub package: RootPackage,

    /// Book title, if the package declares one
    pub title: Option<String>,

    /// File name of the archive this package produces
    pub archive_name: String,

    /// Image size frequency table
    pub survey: SizeSurvey,

    /// Inferred full-page background size
    pub canonical: Dimension,

    /// Pages in spine order
    pub pages: Vec<PagePlan>,
}

impl PackagePlan {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Largest device-scale multiplier used by any page.
    pub fn max_scale(&self) -> f64 {
        self.pages.iter().map(|p| p.scale).fold(1.0, f64::max)
    }
}

/// Render plans for every root package of a source file.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPlan {
    /// The source EPUB
    pub source: PathBuf,

    /// One plan per root package, in container order
    pub packages: Vec<PackagePlan>,
}

/// Everything [`plan_package`] needs besides the package itself.
pub(crate) struct PlanContext<'a> {
    pub root: &'a Path,
    pub probe: &'a dyn DimensionProbe,
    pub parse: &'a ParseOptions,
    pub cancel: &'a CancellationToken,
    pub parallel: bool,
}

/// Parse a package, survey its images and compute every page's window and
/// scale.
pub(crate) fn plan_package(
    ctx: &PlanContext<'_>,
    package: &RootPackage,
    archive_name: String,
) -> Result<PackagePlan> {
    let document = parse_package(ctx.root, package)?;
    let pages = document.pages()?;

    if pages.is_empty() {
        return Err(Error::MalformedPackage(format!(
            "{}: spine has no pages",
            package.full_path
        )));
    }
    if pages.len() > MAX_PAGES {
        return Err(Error::MalformedPackage(format!(
            "{}: {} pages exceeds the supported maximum of {}",
            package.full_path,
            pages.len(),
            MAX_PAGES
        )));
    }

    let images: Vec<&ManifestItem> = document.images().collect();
    let survey = survey_images(ctx, &images)?;
    let canonical = survey.canonical().ok_or_else(|| Error::Probe {
        path: package.document.clone(),
        reason: "manifest declares no images, so the page size can't be inferred".into(),
    })?;

    log::info!(
        "{}: image dimensions found to be {} ({} of {} images)",
        package.full_path,
        canonical,
        survey
            .frequencies()
            .iter()
            .find(|(size, _)| *size == canonical)
            .map_or(0, |(_, n)| *n),
        survey.total()
    );

    let mut plans = Vec::with_capacity(pages.len());
    for entry in pages {
        if ctx.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let viewport = extract_viewport(&entry.path, ctx.parse)?;
        let scale = render_scale(canonical, viewport);
        log::debug!(
            "Page {} ({}): viewport {}, window {}, scale {}",
            entry.index,
            entry.href,
            viewport,
            scale.window,
            scale.scale
        );
        plans.push(PagePlan {
            entry,
            viewport,
            window: scale.window,
            scale: scale.scale,
        });
    }

    Ok(PackagePlan {
        package: package.clone(),
        title: document.title,
        archive_name,
        survey,
        canonical,
        pages: plans,
    })
}

/// Probe every image, keeping manifest order for tie-breaking.
fn survey_images(ctx: &PlanContext<'_>, images: &[&ManifestItem]) -> Result<SizeSurvey> {
    let probe_one = |item: &&ManifestItem| -> Result<Dimension> {
        if ctx.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        ctx.probe.probe(&item.path, ctx.cancel)
    };

    let sizes: Vec<Dimension> = if ctx.parallel {
        images.par_iter().map(probe_one).collect::<Result<_>>()?
    } else {
        images.iter().map(probe_one).collect::<Result<_>>()?
    };

    let survey: SizeSurvey = sizes.into_iter().collect();
    for (size, count) in survey.frequencies() {
        log::debug!("Image size {}: {} image(s)", size, count);
    }
    Ok(survey)
}
