//! EPUB structure parsing: container, package document, page viewports.

mod container;
mod href;
mod opf;
mod options;
mod viewport;

pub use container::{parse_container, parse_container_str, CONTAINER_PATH};
pub use href::resolve_href;
pub use opf::{parse_package, parse_package_str};
pub use options::{ErrorMode, ParseOptions};
pub use viewport::{extract_viewport, parse_viewport_content, viewport_from_markup};

/// Parse XML leniently enough for real-world EPUB content.
pub(crate) fn parse_xml(text: &str) -> std::result::Result<roxmltree::Document<'_>, roxmltree::Error> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options)
}
