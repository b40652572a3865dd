//! Common test utilities: synthetic images and palette fixtures.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use std::io::Cursor;

use colorpalette::{Color, Palette};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub const RED: Color = Color::new(0xff, 0x00, 0x00);
pub const BLUE: Color = Color::new(0x00, 0x00, 0xff);

/// Parse a hex literal, panicking on bad input.
pub fn hex(s: &str) -> Color {
    Color::from_hex(s).expect("valid hex literal")
}

/// Five grays from dark to light.
pub fn grays() -> Palette {
    Palette::new([
        hex("#111111"),
        hex("#333333"),
        hex("#555555"),
        hex("#777777"),
        hex("#999999"),
    ])
}

/// An image whose first `top_rows` rows are `top` and the rest `bottom`.
///
/// Stacking the colors by row keeps both in the sample even when only every
/// tenth pixel is read.
pub fn two_tone(width: u32, height: u32, top_rows: u32, top: Color, bottom: Color) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        let c = if y < top_rows { top } else { bottom };
        Rgba([c.r, c.g, c.b, 255])
    })
}

/// A single-color image.
pub fn solid(width: u32, height: u32, color: Color, alpha: u8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([color.r, color.g, color.b, alpha]))
}

/// A red/green gradient with a fixed blue channel.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 96, 255])
    })
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("PNG encoding");
    buf
}

/// `#rrggbb` with lowercase hex digits.
pub fn is_canonical_hex(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
