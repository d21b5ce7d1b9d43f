//! Package document types.

use super::PageEntry;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed OPF package document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDocument {
    /// Book title from `dc:title`, if present
    pub title: Option<String>,

    /// Manifest items in document order
    pub items: Vec<ManifestItem>,

    /// Spine `idref`s in reading order
    pub spine: Vec<String>,
}

impl PackageDocument {
    /// Look up a manifest item by id.
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Manifest items whose media type is an image, in manifest order.
    pub fn images(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter().filter(|item| item.is_image())
    }

    /// Number of image items.
    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    /// Resolve the spine into ordered page entries.
    ///
    /// Fails if a spine reference names an id the manifest does not declare.
    pub fn pages(&self) -> Result<Vec<PageEntry>> {
        self.spine
            .iter()
            .enumerate()
            .map(|(i, idref)| {
                let item = self.item(idref).ok_or_else(|| {
                    Error::MalformedPackage(format!(
                        "spine references unknown manifest id '{}'",
                        idref
                    ))
                })?;
                Ok(PageEntry {
                    index: i + 1,
                    id: item.id.clone(),
                    href: item.href.clone(),
                    path: item.path.clone(),
                })
            })
            .collect()
    }
}

/// A single `<item>` of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    /// Item id
    pub id: String,

    /// `href` as written in the package document
    pub href: String,

    /// Declared media type
    pub media_type: String,

    /// Local file location, resolved against the package directory
    pub path: PathBuf,
}

impl ManifestItem {
    /// Check if this item is an image.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, href: &str, media_type: &str) -> ManifestItem {
        ManifestItem {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            path: PathBuf::from("/book/OEBPS").join(href),
        }
    }

    fn sample() -> PackageDocument {
        PackageDocument {
            title: Some("Sample".into()),
            items: vec![
                item("p1", "p1.xhtml", "application/xhtml+xml"),
                item("img1", "img/1.jpg", "image/jpeg"),
                item("p2", "p2.xhtml", "application/xhtml+xml"),
                item("css", "style.css", "text/css"),
                item("img2", "img/2.png", "image/png"),
            ],
            spine: vec!["p2".into(), "p1".into()],
        }
    }

    #[test]
    fn test_images_filter() {
        let doc = sample();
        let ids: Vec<_> = doc.images().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["img1", "img2"]);
        assert_eq!(doc.image_count(), 2);
    }

    #[test]
    fn test_pages_follow_spine_order() {
        let pages = sample().pages().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 1);
        assert_eq!(pages[0].href, "p2.xhtml");
        assert_eq!(pages[1].index, 2);
        assert_eq!(pages[1].href, "p1.xhtml");
    }

    #[test]
    fn test_pages_unknown_idref() {
        let mut doc = sample();
        doc.spine.push("missing".into());
        let result = doc.pages();
        assert!(matches!(result, Err(Error::MalformedPackage(msg)) if msg.contains("missing")));
    }
}
