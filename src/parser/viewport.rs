//! Page viewport extraction.
//!
//! Fixed-layout pages declare their intrinsic pixel size with
//! `<meta name="viewport" content="width=600, height=800"/>` in the page
//! head. A page without the declaration is sized to the canonical
//! background, signalled here as [`Dimension::UNSPECIFIED`].

use super::ParseOptions;
use crate::error::{Error, Result};
use crate::model::Dimension;
use std::fs;
use std::io;
use std::path::Path;

/// Read the declared viewport of a page document.
///
/// Returns `0x0` when the page has no viewport declaration. A declaration
/// whose width or height can't be read is an error in strict mode and is
/// treated as absent in lenient mode.
pub fn extract_viewport(path: &Path, options: &ParseOptions) -> Result<Dimension> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            Error::MalformedPackage(format!("page document {} not found", path.display()))
        }
        _ => Error::Io(e),
    })?;

    match viewport_from_markup(&text) {
        Ok(size) => Ok(size),
        Err(e) if options.is_lenient() => {
            log::warn!("{}: {}; using canonical size", path.display(), e);
            Ok(Dimension::UNSPECIFIED)
        }
        Err(Error::MalformedPackage(msg)) => Err(Error::MalformedPackage(format!(
            "{}: {}",
            path.display(),
            msg
        ))),
        Err(e) => Err(e),
    }
}

/// Read the viewport declaration from page markup.
///
/// Markup that isn't well-formed XML (HTML entities, unclosed tags) is
/// scanned for the `<meta>` tag instead.
pub fn viewport_from_markup(text: &str) -> Result<Dimension> {
    let content = match super::parse_xml(text) {
        Ok(doc) => find_viewport_meta(&doc).map(str::to_string),
        Err(e) => {
            log::debug!("Page is not well-formed XML ({}), scanning for viewport", e);
            scan_viewport_meta(text)
        }
    };

    match content {
        None => Ok(Dimension::UNSPECIFIED),
        Some(content) => parse_viewport_content(&content).ok_or_else(|| {
            Error::MalformedPackage(format!("unreadable viewport declaration '{}'", content))
        }),
    }
}

/// Parse a viewport `content` value such as `width=600px, height=800px`.
///
/// Non-digit characters are stripped from each value, so unit suffixes are
/// tolerated. `width=0, height=0` means no declared size and yields
/// [`Dimension::UNSPECIFIED`]. Returns `None` when an axis is missing or
/// only one of them is zero.
pub fn parse_viewport_content(content: &str) -> Option<Dimension> {
    let mut width = None;
    let mut height = None;

    for pair in content.split([',', ';']) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "width" => width = digits_only(value),
            "height" => height = digits_only(value),
            _ => {}
        }
    }

    let size = Dimension::new(width?, height?);
    if size.is_unspecified() {
        return Some(size);
    }
    (!size.is_degenerate()).then_some(size)
}

fn digits_only(value: &str) -> Option<u32> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn find_viewport_meta<'a>(doc: &'a roxmltree::Document<'_>) -> Option<&'a str> {
    let head = doc
        .root_element()
        .children()
        .find(|n| n.tag_name().name() == "head")?;
    head.children()
        .filter(|n| n.tag_name().name() == "meta")
        .find(|n| n.attribute("name") == Some("viewport"))
        .and_then(|n| n.attribute("content"))
}

fn scan_viewport_meta(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find("<meta") {
        let start = offset + pos;
        let end = lower[start..].find('>').map(|e| start + e)?;
        let tag = &text[start..end];
        let name = tag_attribute(tag, "name");
        if name.is_some_and(|n| n.eq_ignore_ascii_case("viewport")) {
            return tag_attribute(tag, "content").map(str::to_string);
        }
        offset = end;
    }
    None
}

fn tag_attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let lower = tag.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find(name) {
        let start = offset + pos;
        offset = start + name.len();

        let preceded_by_space = start > 0 && lower.as_bytes()[start - 1].is_ascii_whitespace();
        let rest = lower[offset..].trim_start();
        if !preceded_by_space || !rest.starts_with('=') {
            continue;
        }

        let value_start = tag.len() - rest.len() + 1;
        let value = tag[value_start..].trim_start();
        let quote = value.chars().next()?;
        if quote == '"' || quote == '\'' {
            let inner = &value[1..];
            return inner.find(quote).map(|end| &inner[..end]);
        }
        let end = value
            .find(|c: char| c.is_ascii_whitespace() || c == '/')
            .unwrap_or(value.len());
        return Some(&value[..end]);
    }
    None
}
