//! Data model for fixed-layout EPUB conversion.
//!
//! These types describe what the pipeline knows about a book at each stage:
//! the extracted container and its root packages, the parsed package
//! documents, and the per-page render plans that drive rasterization.

mod container;
mod geometry;
mod package;
mod page;

pub use container::{Container, RootPackage};
pub use geometry::Dimension;
pub use package::{ManifestItem, PackageDocument};
pub use page::{page_file_name, PageEntry, PagePlan, RenderedPage, MAX_PAGES};
