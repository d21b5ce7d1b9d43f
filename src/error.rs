//! Error types for epub2cbz library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for epub2cbz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source could not be read as a zip archive.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The embedded `mimetype` marker is not `application/epub+zip`.
    #[error("Invalid mime type {0:?}: not an EPUB file")]
    InvalidArchive(String),

    /// `META-INF/container.xml` is missing or declares no root package.
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// A package document has an unresolvable manifest or spine reference.
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// An XML document could not be parsed.
    #[error("XML error in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    /// The dimension probe failed or produced unparsable output.
    #[error("Failed to probe image size of {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// The rasterizer failed or produced no output for a page.
    #[error("Failed to render page {page} ({path}): {reason}")]
    Render {
        page: usize,
        path: PathBuf,
        reason: String,
    },

    /// The output archive could not be created.
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// The run was cancelled before it finished.
    #[error("Conversion cancelled")]
    Cancelled,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Process exit status the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArchive(_) => 2,
            Error::Cancelled => 130,
            _ => 1,
        }
    }

    pub(crate) fn xml(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Error::Xml {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
