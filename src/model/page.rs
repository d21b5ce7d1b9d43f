//! Page-level types.

use super::Dimension;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest page count the fixed-width page names can order correctly.
pub const MAX_PAGES: usize = 99_999;

/// File name of the rendered image for a 1-based page index.
pub fn page_file_name(index: usize) -> String {
    format!("page_{:05}.png", index)
}

/// A spine reference resolved to its manifest item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Page number (1-indexed, spine order)
    pub index: usize,

    /// Manifest id of the page document
    pub id: String,

    /// `href` as written in the manifest
    pub href: String,

    /// Local file location of the page document
    pub path: PathBuf,
}

/// Everything needed to rasterize one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// The page being rendered
    pub entry: PageEntry,

    /// Viewport declared by the page (`0x0` when absent)
    pub viewport: Dimension,

    /// Window size handed to the rasterizer
    pub window: Dimension,

    /// Device-scale multiplier, always >= 1.0
    pub scale: f64,
}

impl PagePlan {
    /// Name of the image this page renders to.
    pub fn output_name(&self) -> String {
        page_file_name(self.entry.index)
    }

    /// Approximate pixel size of the rendered image.
    pub fn output_size(&self) -> Dimension {
        Dimension::new(
            (self.window.width as f64 * self.scale).round() as u32,
            (self.window.height as f64 * self.scale).round() as u32,
        )
    }
}

/// A rasterized page waiting to be packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub index: usize,

    /// Location of the image inside the package's output directory
    pub path: PathBuf,
}
