//! In-process zip extraction and creation.

use super::Archiver;
use crate::detect::read_mimetype_from_path;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Zip archiver backed by the `zip` crate.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    compression: CompressionMethod,
}

impl ZipArchiver {
    /// Create an archiver that deflates entries.
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// Store entries without compression (images are already compressed).
    pub fn stored() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    fn read_marker(&self, source: &Path) -> Result<String> {
        read_mimetype_from_path(source)
    }

    fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        let file = File::open(source)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        log::debug!(
            "Extracting {} entries from {} into {}",
            archive.len(),
            source.display(),
            dest.display()
        );
        archive.extract(dest)?;
        Ok(())
    }

    fn create(&self, files: &[PathBuf], dest: &Path) -> Result<()> {
        let mut seen = HashSet::new();
        let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
        let options = SimpleFileOptions::default().compression_method(self.compression);

        for path in files {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    Error::Packaging(format!("unusable file name: {}", path.display()))
                })?;
            if !seen.insert(name.to_string()) {
                return Err(Error::Packaging(format!(
                    "duplicate entry name {} in archive",
                    name
                )));
            }

            zip.start_file(name, options)?;
            let mut input = File::open(path)?;
            io::copy(&mut input, &mut zip)?;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(())
    }
}
