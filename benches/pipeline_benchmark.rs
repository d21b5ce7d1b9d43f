//! Benchmarks for epub2cbz planning performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks cover the in-process parts of a conversion with
//! synthetic package documents and pages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use epub2cbz::{canonical_size, Dimension};
use std::path::Path;

/// Creates a package document with the given number of pages, each with
/// its own background image.
fn create_test_opf(page_count: usize) -> String {
    let mut manifest = String::new();
    let mut spine = String::new();
    for i in 1..=page_count {
        manifest.push_str(&format!(
            "<item id=\"bg{0}\" href=\"images/bg{0}.jpg\" media-type=\"image/jpeg\"/>\n\
             <item id=\"p{0}\" href=\"text/p{0}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
            i
        ));
        spine.push_str(&format!("<itemref idref=\"p{}\"/>\n", i));
    }
    format!(
        "<?xml version=\"1.0\"?>\n<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\">\n\
         <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\"><dc:title>Bench</dc:title></metadata>\n\
         <manifest>\n{}</manifest>\n<spine>\n{}</spine>\n</package>\n",
        manifest, spine
    )
}

const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title>Page</title>
<meta name="viewport" content="width=600, height=800"/>
<link rel="stylesheet" href="../style.css"/>
</head>
<body><div class="page"><img src="../images/bg1.jpg" alt=""/></div></body>
</html>"#;

/// Benchmark viewport extraction.
fn bench_viewport(c: &mut Criterion) {
    c.bench_function("viewport_content", |b| {
        b.iter(|| {
            epub2cbz::parser::parse_viewport_content(black_box("width=600px, height=800px"))
        });
    });

    c.bench_function("viewport_markup", |b| {
        b.iter(|| epub2cbz::parser::viewport_from_markup(black_box(PAGE)).unwrap());
    });

    // HTML entities force the textual fallback
    let html = PAGE.replace("<title>Page</title>", "<title>Page&nbsp;1</title>");
    c.bench_function("viewport_markup_fallback", |b| {
        b.iter(|| epub2cbz::parser::viewport_from_markup(black_box(&html)).unwrap());
    });
}

/// Benchmark package document parsing at various sizes.
fn bench_package_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_parsing");

    for page_count in [10, 100, 1000].iter() {
        let opf = create_test_opf(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                epub2cbz::parser::parse_package_str(black_box(&opf), Path::new("/book"), "OEBPS")
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark canonical size inference.
fn bench_size_survey(c: &mut Criterion) {
    let sizes: Vec<Dimension> = (0..1000u32)
        .map(|i| match i % 10 {
            0 => Dimension::new(600, 900),
            1 => Dimension::new(64, 64),
            _ => Dimension::new(1200, 1600),
        })
        .collect();

    c.bench_function("canonical_size_1000", |b| {
        b.iter(|| canonical_size(black_box(sizes.iter().copied())));
    });
}

criterion_group!(
    benches,
    bench_viewport,
    bench_package_parsing,
    bench_size_survey,
);
criterion_main!(benches);
