//! The five-color palette and its text exports.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Number of entries in every palette.
pub const PALETTE_SIZE: usize = 5;

/// Neutral gray used to pad palettes when an image yields too few colors.
///
/// A product choice rather than a derived value; overridable through
/// [`crate::config::PaletteConfig::placeholder`].
pub const PLACEHOLDER: Color = Color::new(0xe5, 0xe7, 0xeb);

/// An ordered, fixed-length set of colors.
///
/// Index 0 is the entry selected after the palette is regenerated; beyond that
/// order carries no ranking and entries need not be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette([Color; PALETTE_SIZE]);

impl Palette {
    pub const fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self(colors)
    }

    /// Build a palette from any number of candidates: extras are dropped and
    /// missing entries are filled with `filler`.
    pub fn from_candidates<I>(candidates: I, filler: Color) -> Self
    where
        I: IntoIterator<Item = Color>,
    {
        let mut colors = [filler; PALETTE_SIZE];
        for (slot, color) in colors.iter_mut().zip(candidates) {
            *slot = color;
        }
        Self(colors)
    }

    /// The entry auto-selected after regeneration.
    pub const fn first(&self) -> Color {
        let [first, ..] = self.0;
        first
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.0.iter().copied()
    }

    pub const fn colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.0
    }

    pub fn contains(&self, color: Color) -> bool {
        self.0.contains(&color)
    }

    /// Hex strings in palette order.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.iter().map(Color::to_hex).collect()
    }

    /// CSS custom properties `--p1`..`--p5` inside a `:root` block.
    pub fn to_css_variables(&self) -> String {
        let vars = self
            .iter()
            .enumerate()
            .map(|(i, color)| format!("  --p{}: {color};", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        format!(":root {{\n{vars}\n}}")
    }

    /// Tailwind config extending the theme colors with `"p1"`..`"p5"`.
    pub fn to_tailwind_config(&self) -> String {
        let mut out = String::from("module.exports = {\n  theme: { extend: { colors: {\n");
        for (i, color) in self.iter().enumerate() {
            // Writing to a String cannot fail
            let _ = writeln!(out, "    \"p{}\": \"{color}\",", i + 1);
        }
        out.push_str("  } } }\n}");
        out
    }
}

impl From<[Color; PALETTE_SIZE]> for Palette {
    fn from(colors: [Color; PALETTE_SIZE]) -> Self {
        Self(colors)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn grays() -> Palette {
        Palette::new([
            Color::new(0x11, 0x11, 0x11),
            Color::new(0x22, 0x22, 0x22),
            Color::new(0x33, 0x33, 0x33),
            Color::new(0x44, 0x44, 0x44),
            Color::new(0x55, 0x55, 0x55),
        ])
    }

    #[test]
    fn test_placeholder_literal() {
        assert_eq!(PLACEHOLDER.to_hex(), "#e5e7eb");
    }

    #[test]
    fn test_from_candidates_pads() {
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        let p = Palette::from_candidates([red, blue], PLACEHOLDER);
        assert_eq!(p.colors(), &[red, blue, PLACEHOLDER, PLACEHOLDER, PLACEHOLDER]);
    }

    #[test]
    fn test_from_candidates_truncates() {
        let candidates = (0..6u8).map(|i| Color::new(i, i, i));
        let p = Palette::from_candidates(candidates, PLACEHOLDER);
        assert_eq!(p.get(4), Some(Color::new(4, 4, 4)));
        assert_eq!(p.get(5), None);
    }

    #[test]
    fn test_from_candidates_empty() {
        let p = Palette::from_candidates(std::iter::empty(), PLACEHOLDER);
        assert!(p.iter().all(|c| c == PLACEHOLDER));
    }

    #[test]
    fn test_css_export_exact() {
        let expected = ":root {\n  --p1: #111111;\n  --p2: #222222;\n  --p3: #333333;\n  --p4: #444444;\n  --p5: #555555;\n}";
        assert_eq!(grays().to_css_variables(), expected);
    }

    #[test]
    fn test_tailwind_export_exact() {
        let expected = "module.exports = {\n  theme: { extend: { colors: {\n    \"p1\": \"#111111\",\n    \"p2\": \"#222222\",\n    \"p3\": \"#333333\",\n    \"p4\": \"#444444\",\n    \"p5\": \"#555555\",\n  } } }\n}";
        assert_eq!(grays().to_tailwind_config(), expected);
    }

    #[test]
    fn test_serializes_as_array_of_hex() {
        let json = serde_json::to_string(&grays()).unwrap();
        assert_eq!(
            json,
            r##"["#111111","#222222","#333333","#444444","#555555"]"##
        );
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grays());
    }
}
