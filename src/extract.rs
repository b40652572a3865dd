//! Palette extraction from images.
//!
//! Decoding is delegated to the `image` crate; extraction itself only needs
//! RGBA pixel data and never fails once that is available.

use std::rc::Rc;

use image::RgbaImage;

use crate::color::Color;
use crate::config::PaletteConfig;
use crate::error::Result;
use crate::palette::Palette;
use crate::quantize::{MedianCut, Quantizer};

/// Pixels more transparent than this are ignored.
const MIN_ALPHA: u8 = 125;
/// Channels above this count as near-white.
const WHITE_THRESHOLD: u8 = 250;

/// Derives a five-color palette from pixel data.
#[derive(Debug, Clone)]
pub struct PaletteExtractor {
    quantizer: Rc<dyn Quantizer>,
    candidate_count: usize,
    quality: usize,
    ignore_white: bool,
    placeholder: Color,
}

impl Default for PaletteExtractor {
    fn default() -> Self {
        Self::new(&PaletteConfig::default())
    }
}

impl PaletteExtractor {
    /// Extractor using the median cut quantizer.
    pub fn new(config: &PaletteConfig) -> Self {
        Self {
            quantizer: Rc::new(MedianCut),
            candidate_count: config.candidate_count,
            quality: config.quality.max(1),
            ignore_white: config.ignore_white,
            placeholder: config.placeholder,
        }
    }

    /// Swap in a different quantizer.
    #[must_use]
    pub fn with_quantizer(mut self, quantizer: impl Quantizer + 'static) -> Self {
        self.quantizer = Rc::new(quantizer);
        self
    }

    /// Decode encoded image bytes (PNG, JPEG, WebP) to RGBA.
    pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
        Ok(image::load_from_memory(bytes)?.to_rgba8())
    }

    pub fn extract(&self, image: &RgbaImage) -> Palette {
        self.extract_rgba(image.as_raw())
    }

    /// Extract from raw RGBA bytes (e.g. canvas `ImageData`). A trailing
    /// partial pixel is ignored.
    pub fn extract_rgba(&self, rgba: &[u8]) -> Palette {
        let pixels = self.sample(rgba);
        let candidates = self.quantizer.quantize(&pixels, self.candidate_count);
        Palette::from_candidates(candidates, self.placeholder)
    }

    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Palette> {
        let image = Self::decode(bytes)?;
        Ok(self.extract(&image))
    }

    /// Every `quality`-th opaque pixel, optionally skipping near-white ones.
    fn sample(&self, rgba: &[u8]) -> Vec<Color> {
        rgba.chunks_exact(4)
            .step_by(self.quality)
            .filter_map(|px| match *px {
                [_, _, _, a] if a < MIN_ALPHA => None,
                [r, g, b, _]
                    if self.ignore_white
                        && r > WHITE_THRESHOLD
                        && g > WHITE_THRESHOLD
                        && b > WHITE_THRESHOLD =>
                {
                    None
                }
                [r, g, b, _] => Some(Color::new(r, g, b)),
                _ => None,
            })
            .collect()
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
    use crate::palette::PLACEHOLDER;

    fn every_pixel() -> PaletteExtractor {
        PaletteExtractor::new(&PaletteConfig {
            quality: 1,
            ..PaletteConfig::default()
        })
    }

    #[derive(Debug)]
    struct Fixed(Vec<Color>);

    impl Quantizer for Fixed {
        fn quantize(&self, _pixels: &[Color], max_colors: usize) -> Vec<Color> {
            assert_eq!(max_colors, 6, "extractor asks for six candidates");
            self.0.clone()
        }
    }

    #[test]
    fn test_truncates_six_candidates_to_five() {
        let six: Vec<Color> = (1..=6u8).map(|i| Color::new(i, i, i)).collect();
        let extractor = PaletteExtractor::default().with_quantizer(Fixed(six));
        let palette = extractor.extract_rgba(&[0, 0, 0, 255]);
        assert_eq!(palette.get(4), Some(Color::new(5, 5, 5)));
    }

    #[test]
    fn test_transparent_pixels_skipped() {
        let rgba = [10, 20, 30, 255, 200, 0, 0, 0, 200, 0, 0, 124];
        let palette = every_pixel().extract_rgba(&rgba);
        assert_eq!(palette.first(), Color::new(10, 20, 30));
        assert_eq!(palette.get(1), Some(PLACEHOLDER));
    }

    #[test]
    fn test_near_white_skipped_by_default() {
        let rgba = [255, 255, 255, 255, 251, 252, 253, 255, 40, 40, 40, 255];
        let palette = every_pixel().extract_rgba(&rgba);
        assert_eq!(palette.first(), Color::new(40, 40, 40));
        assert_eq!(palette.get(1), Some(PLACEHOLDER));
    }

    #[test]
    fn test_near_white_kept_when_configured() {
        let extractor = PaletteExtractor::new(&PaletteConfig {
            quality: 1,
            ignore_white: false,
            ..PaletteConfig::default()
        });
        let palette = extractor.extract_rgba(&[255, 255, 255, 255]);
        assert_eq!(palette.first(), Color::WHITE);
    }

    #[test]
    fn test_quality_step() {
        // Pixels 0 and 2 are sampled with quality 2, pixel 1 is not
        let extractor = PaletteExtractor::new(&PaletteConfig {
            quality: 2,
            ..PaletteConfig::default()
        });
        let rgba = [10, 10, 10, 255, 200, 0, 0, 255, 10, 10, 10, 255];
        let palette = extractor.extract_rgba(&rgba);
        assert!(!palette.contains(Color::new(200, 0, 0)));
    }

    #[test]
    fn test_empty_image_is_all_placeholder() {
        let palette = PaletteExtractor::default().extract_rgba(&[]);
        assert!(palette.iter().all(|c| c == PLACEHOLDER));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = PaletteExtractor::decode(b"definitely not a png").unwrap_err();
        assert!(matches!(err, crate::error::PaletteError::Decode(_)));
    }
}
