//! Color conversion, WCAG contrast and harmonic variant tests
//!
//! Covers the public color helpers the UI relies on:
//! - `rgb_to_hex`: canonical lowercase `#rrggbb`
//! - `contrast_ratio`: symmetric, bounded to `[1, 21]`
//! - `generate_variants`: complementary and triadic hue rotations
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

mod common;

use colorpalette::color::{
    best_text_color, contrast_ratio, format_ratio, generate_variants, rgb_to_hex,
};
use colorpalette::Color;
use common::*;
use test_case::test_case;

fn assert_close(actual: Color, expected: Color) {
    let near = actual
        .to_array()
        .iter()
        .zip(expected.to_array())
        .all(|(a, e)| a.abs_diff(e) <= 2);
    assert!(near, "expected ~{expected}, got {actual}");
}

/// A coarse lattice over the RGB cube (6 levels per channel).
fn lattice() -> Vec<Color> {
    let levels = [0u8, 51, 102, 153, 204, 255];
    let mut out = Vec::new();
    for r in levels {
        for g in levels {
            for b in levels {
                out.push(Color::new(r, g, b));
            }
        }
    }
    out
}

// =============================================================================
// rgb_to_hex
// =============================================================================

#[test_case((255, 0, 0), "#ff0000"; "red")]
#[test_case((0, 0, 0), "#000000"; "black")]
#[test_case((1, 2, 3), "#010203"; "zero padded")]
#[test_case((171, 205, 239), "#abcdef"; "lowercase")]
fn test_rgb_to_hex(rgb: (u8, u8, u8), expected: &str) {
    assert_eq!(rgb_to_hex(rgb).to_hex(), expected);
}

#[test]
fn test_rgb_to_hex_always_canonical() {
    for color in lattice() {
        let hex = rgb_to_hex((color.r, color.g, color.b)).to_hex();
        assert!(is_canonical_hex(&hex), "{hex}");
        assert_eq!(Color::from_hex(&hex).unwrap(), color);
    }
}

// =============================================================================
// contrast_ratio
// =============================================================================

#[test]
fn test_contrast_black_white() {
    assert_eq!(format_ratio(contrast_ratio(Color::BLACK, Color::WHITE)), "21.00");
    assert_eq!(format_ratio(contrast_ratio(Color::WHITE, Color::BLACK)), "21.00");
}

#[test]
fn test_contrast_identical_is_one() {
    for color in [RED, BLUE, hex("#777777"), Color::WHITE] {
        assert!((contrast_ratio(color, color) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_contrast_gray_on_white() {
    assert_eq!(format_ratio(contrast_ratio(hex("#777777"), Color::WHITE)), "4.48");
}

#[test]
fn test_contrast_symmetric_and_bounded() {
    let colors = lattice();
    for &a in &colors {
        for &b in colors.iter().step_by(7) {
            let ab = contrast_ratio(a, b);
            let ba = contrast_ratio(b, a);
            assert!((ab - ba).abs() < 1e-12, "{a} vs {b}");
            assert!((1.0..=21.0 + 1e-9).contains(&ab), "{a} vs {b}: {ab}");
        }
    }
}

#[test]
fn test_best_text_color() {
    assert_eq!(best_text_color(hex("#111111")), Color::WHITE);
    assert_eq!(best_text_color(hex("#fafafa")), Color::BLACK);
    assert_eq!(best_text_color(hex("#e5e7eb")), Color::BLACK);
}

// =============================================================================
// generate_variants
// =============================================================================

#[test_case("#ff0000", "#00ffff", "#00ff00", "#0000ff"; "red")]
#[test_case("#00ff00", "#ff00ff", "#0000ff", "#ff0000"; "green")]
#[test_case("#0000ff", "#ffff00", "#ff0000", "#00ff00"; "blue")]
fn test_variants_of_primaries(source: &str, comp: &str, tri_a: &str, tri_b: &str) {
    let variants = generate_variants(hex(source));
    assert_close(variants.complementary, hex(comp));
    assert_close(variants.triadic[0], hex(tri_a));
    assert_close(variants.triadic[1], hex(tri_b));
}

#[test]
fn test_variants_of_gray_are_gray() {
    for gray in grays().iter() {
        let variants = generate_variants(gray);
        assert_close(variants.complementary, gray);
        assert_close(variants.triadic[0], gray);
        assert_close(variants.triadic[1], gray);
    }
}

#[test]
fn test_variants_keep_lightness() {
    let source = hex("#3366cc");
    let l = source.to_hsl().l;
    let variants = generate_variants(source);
    for v in [variants.complementary, variants.triadic[0], variants.triadic[1]] {
        assert!((v.to_hsl().l - l).abs() < 0.02, "{v}");
    }
}

#[test]
fn test_complement_of_complement_returns() {
    for color in lattice().into_iter().step_by(5) {
        let back = generate_variants(generate_variants(color).complementary).complementary;
        assert_close(back, color);
    }
}
