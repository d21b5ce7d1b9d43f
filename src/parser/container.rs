//! `META-INF/container.xml` parsing.

use crate::error::{Error, Result};
use crate::model::{Container, RootPackage};
use std::fs;
use std::io;
use std::path::Path;

/// Location of the container document inside an extracted EPUB.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Resolve the root packages of an extracted EPUB.
///
/// Fails with [`Error::MalformedContainer`] if `META-INF/container.xml` is
/// missing or declares no root package.
pub fn parse_container(root: &Path) -> Result<Container> {
    let path = root.join(CONTAINER_PATH);
    let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            Error::MalformedContainer(format!("{} not found", CONTAINER_PATH))
        }
        _ => Error::Io(e),
    })?;
    parse_container_str(&text, root)
}

/// Resolve root packages from container XML text.
pub fn parse_container_str(text: &str, root: &Path) -> Result<Container> {
    let doc = super::parse_xml(text).map_err(|e| Error::xml(CONTAINER_PATH, e))?;

    let mut packages = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.tag_name().name() == "rootfile")
        .filter(|n| n.parent_element().map(|p| p.tag_name().name()) == Some("rootfiles"))
    {
        let full_path = node
            .attribute("full-path")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::MalformedContainer("rootfile without a full-path attribute".into())
            })?;
        packages.push(RootPackage::new(packages.len() + 1, root, full_path));
    }

    if packages.is_empty() {
        return Err(Error::MalformedContainer(
            "container declares no root packages".into(),
        ));
    }

    log::debug!("Container declares {} root package(s)", packages.len());

    Ok(Container {
        root: root.to_path_buf(),
        packages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SINGLE: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    #[test]
    fn test_single_rootfile() {
        let container = parse_container_str(SINGLE, Path::new("/book")).unwrap();
        assert_eq!(container.packages.len(), 1);
        assert!(!container.has_multiple_packages());
        let pkg = &container.packages[0];
        assert_eq!(pkg.index, 1);
        assert_eq!(pkg.full_path, "OEBPS/content.opf");
        assert_eq!(pkg.dir, PathBuf::from("/book/OEBPS"));
    }

    #[test]
    fn test_multiple_rootfiles_keep_order() {
        let xml = r#"<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="vol2/package.opf"/>
    <rootfile full-path="vol1/package.opf"/>
  </rootfiles>
</container>"#;
        let container = parse_container_str(xml, Path::new("/book")).unwrap();
        assert!(container.has_multiple_packages());
        assert_eq!(container.packages[0].full_path, "vol2/package.opf");
        assert_eq!(container.packages[1].full_path, "vol1/package.opf");
        assert_eq!(container.packages[1].index, 2);
    }

    #[test]
    fn test_no_rootfiles() {
        let xml = r#"<container><rootfiles/></container>"#;
        let result = parse_container_str(xml, Path::new("/book"));
        assert!(matches!(result, Err(Error::MalformedContainer(_))));
    }

    #[test]
    fn test_rootfile_without_path() {
        let xml = r#"<container><rootfiles><rootfile/></rootfiles></container>"#;
        let result = parse_container_str(xml, Path::new("/book"));
        assert!(matches!(result, Err(Error::MalformedContainer(_))));
    }

    #[test]
    fn test_invalid_xml() {
        let result = parse_container_str("<container><rootfiles>", Path::new("/book"));
        assert!(matches!(result, Err(Error::Xml { .. })));
    }

    #[test]
    fn test_missing_container_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_container(dir.path());
        assert!(matches!(result, Err(Error::MalformedContainer(_))));
    }
}
