//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use epub2cbz::tools::{CancellationToken, DimensionProbe, RasterRequest, Rasterizer};
use epub2cbz::{Dimension, Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One page of a package fixture.
pub struct PageFixture {
    pub id: String,
    pub href: String,
    pub viewport: Option<(u32, u32)>,
}

/// One root package of an EPUB fixture.
pub struct PackageFixture {
    pub full_path: String,
    pub title: Option<String>,
    pub images: Vec<String>,
    pub pages: Vec<PageFixture>,
    pub spine: Option<Vec<String>>,
}

impl PackageFixture {
    pub fn new(full_path: &str) -> Self {
        Self {
            full_path: full_path.to_string(),
            title: None,
            images: Vec::new(),
            pages: Vec::new(),
            spine: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add an image, `href` relative to the package document.
    pub fn image(mut self, href: &str) -> Self {
        self.images.push(href.to_string());
        self
    }

    /// Add a page, `href` relative to the package document.
    pub fn page(mut self, id: &str, href: &str, viewport: Option<(u32, u32)>) -> Self {
        self.pages.push(PageFixture {
            id: id.to_string(),
            href: href.to_string(),
            viewport,
        });
        self
    }

    /// Override the spine order (defaults to page declaration order).
    pub fn spine(mut self, ids: &[&str]) -> Self {
        self.spine = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    fn dir(&self) -> &str {
        self.full_path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    fn entry_name(&self, href: &str) -> String {
        if self.dir().is_empty() {
            href.to_string()
        } else {
            format!("{}/{}", self.dir(), href)
        }
    }

    fn opf(&self) -> String {
        let mut manifest = String::new();
        for (i, image) in self.images.iter().enumerate() {
            manifest.push_str(&format!(
                "    <item id=\"img{}\" href=\"{}\" media-type=\"image/png\"/>\n",
                i + 1,
                image
            ));
        }
        for page in &self.pages {
            manifest.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
                page.id, page.href
            ));
        }

        let spine_ids = match &self.spine {
            Some(ids) => ids.clone(),
            None => self.pages.iter().map(|p| p.id.clone()).collect(),
        };
        let spine: String = spine_ids
            .iter()
            .map(|id| format!("    <itemref idref=\"{}\"/>\n", id))
            .collect();

        let title = self
            .title
            .as_ref()
            .map(|t| format!("    <dc:title>{}</dc:title>\n", t))
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:fixture</dc:identifier>
{}  </metadata>
  <manifest>
{}  </manifest>
  <spine>
{}  </spine>
</package>
"#,
            title, manifest, spine
        )
    }
}

fn page_xhtml(page: &PageFixture) -> String {
    let meta = page
        .viewport
        .map(|(w, h)| {
            format!(
                "    <meta name=\"viewport\" content=\"width={}, height={}\"/>\n",
                w, h
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head>
    <title>{}</title>
{}  </head>
  <body><div class="page"></div></body>
</html>
"#,
        page.id, meta
    )
}

/// Builds EPUB archives on disk.
pub struct EpubBuilder {
    mimetype: String,
    packages: Vec<PackageFixture>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            mimetype: "application/epub+zip".to_string(),
            packages: Vec::new(),
        }
    }

    pub fn mimetype(mut self, mimetype: &str) -> Self {
        self.mimetype = mimetype.to_string();
        self
    }

    pub fn package(mut self, package: PackageFixture) -> Self {
        self.packages.push(package);
        self
    }

    /// Write the archive to `path`.
    pub fn write(&self, path: &Path) -> PathBuf {
        let file = fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let stored =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default();

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(self.mimetype.as_bytes()).unwrap();

        let rootfiles: String = self
            .packages
            .iter()
            .map(|p| {
                format!(
                    "    <rootfile full-path=\"{}\" media-type=\"application/oebps-package+xml\"/>\n",
                    p.full_path
                )
            })
            .collect();
        let container = format!(
            r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
{}  </rootfiles>
</container>
"#,
            rootfiles
        );
        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(container.as_bytes()).unwrap();

        for package in &self.packages {
            zip.start_file(package.full_path.as_str(), deflated).unwrap();
            zip.write_all(package.opf().as_bytes()).unwrap();

            for image in &package.images {
                zip.start_file(package.entry_name(image), stored).unwrap();
                zip.write_all(b"\x89PNG fixture").unwrap();
            }
            for page in &package.pages {
                zip.start_file(package.entry_name(&page.href), deflated)
                    .unwrap();
                zip.write_all(page_xhtml(page).as_bytes()).unwrap();
            }
        }

        zip.finish().unwrap();
        path.to_path_buf()
    }
}

/// Reports sizes from a table keyed by image file name.
pub struct FakeProbe {
    sizes: HashMap<String, Dimension>,
    calls: Mutex<usize>,
}

impl FakeProbe {
    pub fn new(sizes: &[(&str, (u32, u32))]) -> Self {
        Self {
            sizes: sizes
                .iter()
                .map(|(name, size)| (name.to_string(), Dimension::from(*size)))
                .collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl DimensionProbe for FakeProbe {
    fn name(&self) -> &str {
        "fake-probe"
    }

    fn probe(&self, image: &Path, _cancel: &CancellationToken) -> Result<Dimension> {
        *self.calls.lock().unwrap() += 1;
        let name = file_name(image);
        self.sizes.get(&name).copied().ok_or_else(|| Error::Probe {
            path: image.to_path_buf(),
            reason: "unknown fixture image".into(),
        })
    }
}

/// A rasterizer call as seen by [`FakeRasterizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCall {
    pub page: usize,
    pub document: String,
    pub window: Dimension,
    pub scale: f64,
}

/// Writes `screenshot.png` holding the page document's file name.
pub struct FakeRasterizer {
    calls: Mutex<Vec<RasterCall>>,
    failures: Mutex<HashMap<String, u32>>,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Fail the first `times` renders of the page document named `document`.
    pub fn failing(self, document: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(document.to_string(), times);
        self
    }

    /// Calls sorted by page document then page number.
    pub fn calls(&self) -> Vec<RasterCall> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_by(|a, b| (a.page, &a.document).cmp(&(b.page, &b.document)));
        calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake-rasterizer"
    }

    fn rasterize(
        &self,
        request: &RasterRequest<'_>,
        _cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let document = file_name(request.document);
        self.calls.lock().unwrap().push(RasterCall {
            page: request.page,
            document: document.clone(),
            window: request.window,
            scale: request.scale,
        });

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(&document) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Render {
                    page: request.page,
                    path: request.document.to_path_buf(),
                    reason: "renderer exited with status 1".into(),
                });
            }
        }

        assert!(request.work_dir.is_dir());
        let screenshot = request.work_dir.join("screenshot.png");
        fs::write(&screenshot, document.as_bytes())?;
        Ok(screenshot)
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Entry names and contents of an archive, in archive order.
pub fn read_archive(path: &Path) -> Vec<(String, String)> {
    let file = fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
        entries.push((entry.name().to_string(), content));
    }
    entries
}

/// Names of the entries directly inside `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
