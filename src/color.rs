//! Color math utilities
//!
//! Handles hex parsing and formatting, WCAG relative luminance and contrast
//! ratios, and HSL-based harmonic variants (complementary, triadic).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PaletteError, Result};

/// Linearization threshold for sRGB channels (WCAG 2.x).
const LINEAR_THRESHOLD: f64 = 0.03928;

/// A 24-bit RGB color.
///
/// The canonical external form is `#rrggbb`, lowercase and zero-padded, which
/// is what `Display` and serde produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a new color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or `#rgb` (any case, surrounding whitespace ignored).
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let invalid = || PaletteError::InvalidColor(s.to_string());

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .ok_or_else(invalid)
        };

        match hex.len() {
            6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            // #rgb shorthand: each nibble is doubled (f -> ff)
            3 => Ok(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            _ => Err(invalid()),
        }
    }

    /// Canonical `#rrggbb` string.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// WCAG relative luminance (0.0 for black to 1.0 for white).
    pub fn relative_luminance(self) -> f64 {
        let linear = |c: u8| {
            let c = f64::from(c) / 255.0;
            if c <= LINEAR_THRESHOLD {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Convert to HSL. Achromatic colors report hue 0.
    pub fn to_hsl(self) -> Hsl {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        Hsl {
            h: h * 360.0,
            s,
            l,
        }
    }

    /// Convert from HSL. Hue is taken modulo 360.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let (r, g, b) = hsl_to_rgb(
            hsl.h.rem_euclid(360.0) / 360.0,
            hsl.s.clamp(0.0, 1.0),
            hsl.l.clamp(0.0, 1.0),
        );
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = PaletteError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Hue (degrees, `[0, 360)`), saturation and lightness (`[0, 1]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Rotate the hue by `degrees`, wrapping into `[0, 360)`.
    #[must_use]
    pub fn rotate(self, degrees: f64) -> Self {
        Self {
            h: (self.h + degrees).rem_euclid(360.0),
            ..self
        }
    }
}

/// Harmonic variants derived from a single source color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Variants {
    pub complementary: Color,
    pub triadic: [Color; 2],
}

/// Map a byte triple to its canonical color.
pub fn rgb_to_hex(rgb: (u8, u8, u8)) -> Color {
    Color::from(rgb)
}

/// WCAG relative luminance of `color`.
pub fn relative_luminance(color: Color) -> f64 {
    color.relative_luminance()
}

/// WCAG contrast ratio, `(L_lighter + 0.05) / (L_darker + 0.05)`, in `[1, 21]`.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let lighter = la.max(lb);
    let darker = la.min(lb);
    (lighter + 0.05) / (darker + 0.05)
}

/// Render a contrast ratio the way the UI shows it (`x.xx`).
pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.2}")
}

/// Complementary (+180°) and triadic (+120°, +240°) variants.
///
/// Grays have no hue; they are treated as hue 0 and so map onto themselves.
pub fn generate_variants(color: Color) -> Variants {
    let hsl = color.to_hsl();
    Variants {
        complementary: Color::from_hsl(hsl.rotate(180.0)),
        triadic: [
            Color::from_hsl(hsl.rotate(120.0)),
            Color::from_hsl(hsl.rotate(240.0)),
        ],
    }
}

/// Black or white, whichever reads better on `background`.
pub fn best_text_color(background: Color) -> Color {
    if contrast_ratio(background, Color::BLACK) >= contrast_ratio(background, Color::WHITE) {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

/// Convert RGB to HSL (all components in `[0, 1]`)
#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = f64::midpoint(max, min);

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

/// Convert HSL (all components in `[0, 1]`) to RGB
#[allow(clippy::many_single_char_names)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = unit_to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l.mul_add(-s, l + s)
    };
    let p = 2.0f64.mul_add(l, -q);

    (
        unit_to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        unit_to_byte(hue_to_rgb(p, q, h)),
        unit_to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        return ((q - p) * 6.0).mul_add(t, p);
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p);
    }
    p
}

/// The cast is safe because we clamp to [0, 255] before converting.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn close(a: Color, b: Color, tolerance: u8) -> bool {
        a.r.abs_diff(b.r) <= tolerance
            && a.g.abs_diff(b.g) <= tolerance
            && a.b.abs_diff(b.b) <= tolerance
    }

    #[test_case((255, 255, 255), "#ffffff" ; "white")]
    #[test_case((0, 0, 0), "#000000" ; "black")]
    #[test_case((1, 2, 3), "#010203" ; "zero padded")]
    #[test_case((171, 205, 239), "#abcdef" ; "lowercase")]
    fn test_rgb_to_hex(rgb: (u8, u8, u8), expected: &str) {
        assert_eq!(rgb_to_hex(rgb).to_hex(), expected);
    }

    #[test_case("#FF8040", Color::new(255, 128, 64) ; "uppercase with hash")]
    #[test_case("ff8040", Color::new(255, 128, 64) ; "without hash")]
    #[test_case("  #ff8040 ", Color::new(255, 128, 64) ; "surrounding whitespace")]
    #[test_case("#f80", Color::new(255, 136, 0) ; "shorthand")]
    fn test_parse(input: &str, expected: Color) {
        assert_eq!(Color::from_hex(input).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("#12345" ; "five digits")]
    #[test_case("#gg0000" ; "non hex")]
    #[test_case("#+f0000" ; "sign prefix")]
    #[test_case("rgb(1, 2, 3)" ; "css function")]
    fn test_parse_rejects(input: &str) {
        let err = Color::from_hex(input).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidColor(_)));
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(Color::BLACK.relative_luminance().abs() < 1e-12);
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_luminance_low_channel_uses_linear_segment() {
        // 10/255 = 0.0392 sits just under the 0.03928 threshold
        let expected = 0.2126 * (10.0 / 255.0 / 12.92);
        assert!((hex("#0a0000").relative_luminance() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_contrast_black_white() {
        let ratio = contrast_ratio(Color::BLACK, Color::WHITE);
        assert!((ratio - 21.0).abs() < 1e-9);
        assert_eq!(format_ratio(ratio), "21.00");
    }

    #[test]
    fn test_contrast_same_color_is_one() {
        let c = hex("#3b82f6");
        assert!((contrast_ratio(c, c) - 1.0).abs() < 1e-12);
        assert_eq!(format_ratio(contrast_ratio(c, c)), "1.00");
    }

    #[test]
    fn test_contrast_known_value() {
        // #777777 on white is the classic 4.48:1 near-miss
        assert_eq!(format_ratio(contrast_ratio(hex("#777777"), Color::WHITE)), "4.48");
    }

    #[test]
    fn test_variants_red() {
        let v = generate_variants(hex("#ff0000"));
        assert!(close(v.complementary, hex("#00ffff"), 2), "{}", v.complementary);
        assert!(close(v.triadic[0], hex("#00ff00"), 2), "{}", v.triadic[0]);
        assert!(close(v.triadic[1], hex("#0000ff"), 2), "{}", v.triadic[1]);
    }

    #[test]
    fn test_variants_gray_is_total() {
        let gray = hex("#808080");
        let v = generate_variants(gray);
        assert_eq!(v.complementary, gray);
        assert_eq!(v.triadic, [gray, gray]);
    }

    #[test]
    fn test_hsl_rotation_wraps() {
        let hsl = Hsl {
            h: 300.0,
            s: 1.0,
            l: 0.5,
        };
        assert!((hsl.rotate(120.0).h - 60.0).abs() < 1e-9);
        assert!((hsl.rotate(-360.0).h - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_hsl_round_trip_primary() {
        let blue = hex("#0000ff");
        let hsl = blue.to_hsl();
        assert!((hsl.h - 240.0).abs() < 1e-9);
        assert_eq!(Color::from_hsl(hsl), blue);
    }

    #[test]
    fn test_best_text_color() {
        assert_eq!(best_text_color(hex("#111827")), Color::WHITE);
        assert_eq!(best_text_color(hex("#fde68a")), Color::BLACK);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&hex("#0A0B0C")).unwrap();
        assert_eq!(json, "\"#0a0b0c\"");
        let back: Color = serde_json::from_str("\"#0a0b0c\"").unwrap();
        assert_eq!(back, Color::new(10, 11, 12));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
