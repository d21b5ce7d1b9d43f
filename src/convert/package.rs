//! Output archive assembly.

use crate::error::{Error, Result};
use crate::tools::Archiver;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bundles a directory of rendered pages into one archive.
pub struct ArchivePackager {
    archiver: Arc<dyn Archiver>,
}

impl ArchivePackager {
    /// Create a packager using `archiver`.
    pub fn new(archiver: Arc<dyn Archiver>) -> Self {
        Self { archiver }
    }

    /// Package every file in `pages_dir`, and nothing else, into `dest`.
    ///
    /// Entries are added in lexical file name order, which is page order
    /// for fixed-width page names. The archive is written beside `dest` and
    /// renamed into place once complete.
    pub fn package(&self, pages_dir: &Path, dest: &Path) -> Result<PathBuf> {
        let files = list_files(pages_dir)?;
        if files.is_empty() {
            return Err(Error::Packaging(format!(
                "no rendered pages in {}",
                pages_dir.display()
            )));
        }

        if dest.exists() {
            log::warn!("Overwriting existing {}", dest.display());
        }

        let mut partial = dest.as_os_str().to_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        if let Err(e) = self.archiver.create(&files, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(match e {
                Error::Packaging(_) => e,
                other => Error::Packaging(format!("{}: {}", dest.display(), other)),
            });
        }
        fs::rename(&partial, dest)?;

        log::info!("Wrote {} ({} pages)", dest.display(), files.len());
        Ok(dest.to_path_buf())
    }
}

/// Regular files directly inside `dir`, sorted by file name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
