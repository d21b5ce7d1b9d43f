//! Output and temporary directory names.

use std::path::Path;

/// Extension of the output archives.
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Base name of the source file with its `.epub` extension removed.
pub fn source_base_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());

    let lower = name.to_ascii_lowercase();
    let base = if lower.ends_with(".epub") && name.len() > ".epub".len() {
        &name[..name.len() - ".epub".len()]
    } else {
        source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name.as_str())
    };
    base.to_string()
}

/// File name of the archive for one root package.
///
/// A container with several root packages gets one archive per package,
/// suffixed with the package's 1-based position in `container.xml`.
pub fn archive_file_name(base: &str, package_index: usize, multiple: bool) -> String {
    if multiple {
        format!("{}_{}.{}", base, package_index, ARCHIVE_EXTENSION)
    } else {
        format!("{}.{}", base, ARCHIVE_EXTENSION)
    }
}
