//! OPF package document parsing.

use super::resolve_href;
use crate::error::{Error, Result};
use crate::model::{ManifestItem, PackageDocument, RootPackage};
use std::fs;
use std::io;
use std::path::Path;

/// Parse the package document of a root package.
///
/// `root` is the directory the container was extracted into.
pub fn parse_package(root: &Path, package: &RootPackage) -> Result<PackageDocument> {
    let text = fs::read_to_string(&package.document).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::MalformedPackage(format!(
            "package document {} not found",
            package.full_path
        )),
        _ => Error::Io(e),
    })?;

    let package_dir = package
        .full_path
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or("");

    parse_package_str(&text, root, package_dir)
        .map_err(|e| match e {
            Error::Xml { message, .. } => Error::xml(&package.document, message),
            other => other,
        })
}

/// Parse package document XML text.
///
/// `package_dir` is the package document's directory relative to `root`.
pub fn parse_package_str(text: &str, root: &Path, package_dir: &str) -> Result<PackageDocument> {
    let doc = super::parse_xml(text).map_err(|e| Error::xml(package_dir, e))?;
    let package = doc.root_element();

    let manifest = package
        .children()
        .find(|n| n.tag_name().name() == "manifest")
        .ok_or_else(|| Error::MalformedPackage("package has no manifest".into()))?;

    let mut items = Vec::new();
    for node in manifest
        .children()
        .filter(|n| n.tag_name().name() == "item")
    {
        let id = required_attr(&node, "id")?;
        let href = required_attr(&node, "href")?;
        let media_type = required_attr(&node, "media-type")?;
        let path = resolve_href(root, package_dir, href)?;
        items.push(ManifestItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.trim().to_string(),
            path,
        });
    }

    let spine = package
        .children()
        .find(|n| n.tag_name().name() == "spine")
        .ok_or_else(|| Error::MalformedPackage("package has no spine".into()))?
        .children()
        .filter(|n| n.tag_name().name() == "itemref")
        .map(|n| required_attr(&n, "idref").map(str::to_string))
        .collect::<Result<Vec<_>>>()?;

    let title = package
        .children()
        .find(|n| n.tag_name().name() == "metadata")
        .and_then(|m| m.descendants().find(|n| n.tag_name().name() == "title"))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    log::debug!(
        "Package: {} manifest items, {} spine entries",
        items.len(),
        spine.len()
    );

    Ok(PackageDocument { title, items, spine })
}

fn required_attr<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        Error::MalformedPackage(format!(
            "<{}> without a {} attribute",
            node.tag_name().name(),
            name
        ))
    })
}
