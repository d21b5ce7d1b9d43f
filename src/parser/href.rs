//! Manifest `href` resolution.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve a manifest `href` to a local file inside the container.
///
/// `package_dir` is the package document's directory relative to the
/// container root (`""` when the package sits at the root). Fragments are
/// dropped and `%XX` escapes decoded. References that leave the container or
/// point at another scheme are rejected.
pub fn resolve_href(root: &Path, package_dir: &str, href: &str) -> Result<PathBuf> {
    let href = href.split('#').next().unwrap_or_default();
    if href.is_empty() {
        return Err(Error::MalformedPackage("empty manifest href".into()));
    }
    if href.contains("://") || href.starts_with('/') {
        return Err(Error::MalformedPackage(format!(
            "manifest href '{}' is not a relative path",
            href
        )));
    }

    let decoded = urlencoding::decode(href).map_err(|_| {
        Error::MalformedPackage(format!("manifest href '{}' is not valid UTF-8", href))
    })?;
    let mut parts: Vec<&str> = package_dir
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(Error::MalformedPackage(format!(
                        "manifest href '{}' escapes the container",
                        href
                    )));
                }
            }
            other => parts.push(other),
        }
    }

    let mut path = root.to_path_buf();
    path.extend(parts);
    Ok(path)
}
