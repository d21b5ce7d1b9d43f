//! EPUB type marker detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// The marker an EPUB container must carry in its `mimetype` entry.
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Name of the marker entry at the archive root.
const MIMETYPE_ENTRY: &str = "mimetype";

/// Upper bound on how much of the marker entry is read.
const MIMETYPE_MAX_LEN: u64 = 256;

/// Read the `mimetype` marker of an archive on disk.
///
/// # Example
/// ```no_run
/// use epub2cbz::detect::read_mimetype_from_path;
///
/// let marker = read_mimetype_from_path("book.epub").unwrap();
/// println!("marker: {}", marker);
/// ```
pub fn read_mimetype_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    read_mimetype(BufReader::new(file))
}

/// Read the `mimetype` marker from any seekable zip source.
///
/// Only the marker entry is decompressed; nothing else is extracted.
pub fn read_mimetype<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader)?;
    let entry = match archive.by_name(MIMETYPE_ENTRY) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(Error::InvalidArchive(String::new()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut marker = String::new();
    entry
        .take(MIMETYPE_MAX_LEN)
        .read_to_string(&mut marker)
        .map_err(|_| Error::InvalidArchive("<non-utf8>".into()))?;
    Ok(marker.trim().to_string())
}

/// Fail with [`Error::InvalidArchive`] unless `marker` is the EPUB marker.
pub fn check_mimetype(marker: &str) -> Result<()> {
    if marker.trim() == EPUB_MIMETYPE {
        Ok(())
    } else {
        Err(Error::InvalidArchive(marker.trim().to_string()))
    }
}

/// Check if a file is a zip archive carrying the EPUB marker.
pub fn is_epub<P: AsRef<Path>>(path: P) -> bool {
    read_mimetype_from_path(path)
        .and_then(|marker| check_mimetype(&marker))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_read_valid_marker() {
        let data = archive_with(&[("mimetype", b"application/epub+zip")]);
        let marker = read_mimetype(Cursor::new(data)).unwrap();
        assert_eq!(marker, EPUB_MIMETYPE);
        assert!(check_mimetype(&marker).is_ok());
    }

    #[test]
    fn test_marker_with_trailing_newline() {
        let data = archive_with(&[("mimetype", b"application/epub+zip\n")]);
        let marker = read_mimetype(Cursor::new(data)).unwrap();
        assert!(check_mimetype(&marker).is_ok());
    }

    #[test]
    fn test_wrong_marker() {
        let data = archive_with(&[("mimetype", b"application/x-cbz")]);
        let marker = read_mimetype(Cursor::new(data)).unwrap();
        let result = check_mimetype(&marker);
        assert!(matches!(result, Err(Error::InvalidArchive(m)) if m == "application/x-cbz"));
    }

    #[test]
    fn test_missing_marker_entry() {
        let data = archive_with(&[("META-INF/container.xml", b"<container/>")]);
        let result = read_mimetype(Cursor::new(data));
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = read_mimetype(Cursor::new(b"%PDF-1.7 not a zip".to_vec()));
        assert!(matches!(result, Err(Error::Zip(_))));
    }
}
