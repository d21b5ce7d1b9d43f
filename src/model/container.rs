//! Container-level types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An extracted EPUB container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    /// Directory the archive was extracted into
    pub root: PathBuf,

    /// Root packages in `container.xml` declaration order
    pub packages: Vec<RootPackage>,
}

impl Container {
    /// Whether output archives need a distinguishing suffix.
    pub fn has_multiple_packages(&self) -> bool {
        self.packages.len() > 1
    }
}

/// One `<rootfile>` declared by the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootPackage {
    /// 1-based position in the container's rootfile list
    pub index: usize,

    /// The `full-path` attribute, relative to the container root
    pub full_path: String,

    /// Absolute path of the package document
    pub document: PathBuf,

    /// Directory containing the package document
    pub dir: PathBuf,
}

impl RootPackage {
    /// Build a descriptor for `full_path` inside `root`.
    pub fn new(index: usize, root: &Path, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let document = root.join(&full_path);
        let dir = document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        Self {
            index,
            full_path,
            document,
            dir,
        }
    }
}
