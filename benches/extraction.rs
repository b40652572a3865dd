//! Benchmarks for palette extraction.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use colorpalette::quantize::{MedianCut, Quantizer};
use colorpalette::{Color, PaletteConfig, PaletteExtractor};

fn gradient(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        Rgba([
            (x * 255 / size) as u8,
            (y * 255 / size) as u8,
            ((x + y) * 127 / size) as u8,
            255,
        ])
    })
}

/// Extraction from decoded pixels at the default sampling quality
fn bench_extract(c: &mut Criterion) {
    let extractor = PaletteExtractor::new(&PaletteConfig::default());
    let mut group = c.benchmark_group("extract");

    for size in [64u32, 256, 1024] {
        let image = gradient(size);
        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| extractor.extract(black_box(image)))
        });
    }

    group.finish();
}

/// Decode plus extraction from PNG bytes
fn bench_extract_png(c: &mut Criterion) {
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(gradient(512))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("Failed to encode PNG");
    let extractor = PaletteExtractor::new(&PaletteConfig::default());

    c.bench_function("extract_png_512", |b| {
        b.iter(|| extractor.extract_bytes(black_box(&png)).expect("Failed to extract"))
    });
}

/// Quantizer alone, for different candidate counts
fn bench_quantize(c: &mut Criterion) {
    let pixels: Vec<Color> = gradient(256)
        .pixels()
        .map(|p| Color::new(p[0], p[1], p[2]))
        .collect();
    let mut group = c.benchmark_group("median_cut");

    for max_colors in [6usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_colors),
            &max_colors,
            |b, &max_colors| b.iter(|| MedianCut.quantize(black_box(&pixels), max_colors)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_extract_png, bench_quantize);
criterion_main!(benches);
