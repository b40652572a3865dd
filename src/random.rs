//! Random palette generation over an injectable entropy source.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::color::Color;
use crate::palette::{Palette, PALETTE_SIZE};

/// A source of random bytes.
pub trait EntropySource {
    fn next_byte(&mut self) -> u8;
}

/// Entropy backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngEntropy<R>(R);

impl<R: RngCore> RngEntropy<R> {
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngEntropy<StdRng> {
    /// OS-seeded generator (`crypto.getRandomValues` on wasm32).
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible generator for demos and the CLI `--seed` flag.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> EntropySource for RngEntropy<R> {
    fn next_byte(&mut self) -> u8 {
        let [byte, ..] = self.0.next_u32().to_le_bytes();
        byte
    }
}

/// Replays a fixed byte sequence, wrapping around at the end.
///
/// An empty sequence yields zeros.
#[derive(Debug, Clone, Default)]
pub struct SequenceEntropy {
    bytes: Vec<u8>,
    pos: usize,
}

impl SequenceEntropy {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            pos: 0,
        }
    }
}

impl EntropySource for SequenceEntropy {
    fn next_byte(&mut self) -> u8 {
        let byte = self.bytes.get(self.pos).copied().unwrap_or(0);
        self.pos = if self.bytes.is_empty() {
            0
        } else {
            (self.pos + 1) % self.bytes.len()
        };
        byte
    }
}

/// Five independent colors, one byte per channel.
pub fn generate(entropy: &mut dyn EntropySource) -> Palette {
    let mut colors = [Color::BLACK; PALETTE_SIZE];
    for slot in &mut colors {
        let r = entropy.next_byte();
        let g = entropy.next_byte();
        let b = entropy.next_byte();
        *slot = Color::new(r, g, b);
    }
    Palette::new(colors)
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

    fn is_canonical_hex(s: &str) -> bool {
        s.len() == 7
            && s.starts_with('#')
            && s.bytes()
                .skip(1)
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    #[test]
    fn test_sequence_drives_channels_in_order() {
        let mut entropy = SequenceEntropy::new((1..=15).collect::<Vec<u8>>());
        let p = generate(&mut entropy);
        assert_eq!(
            p.to_hex_strings(),
            ["#010203", "#040506", "#070809", "#0a0b0c", "#0d0e0f"]
        );
    }

    #[test]
    fn test_sequence_wraps() {
        let mut entropy = SequenceEntropy::new([0xff, 0x00]);
        let p = generate(&mut entropy);
        assert_eq!(p.first().to_hex(), "#ff00ff");
        assert_eq!(p.get(1).map(Color::to_hex).as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_empty_sequence_yields_black() {
        let mut entropy = SequenceEntropy::default();
        assert!(generate(&mut entropy).iter().all(|c| c == Color::BLACK));
    }

    #[test]
    fn test_random_palettes_are_well_formed() {
        let mut entropy = RngEntropy::from_entropy();
        for _ in 0..50 {
            let p = generate(&mut entropy);
            let hexes = p.to_hex_strings();
            assert_eq!(hexes.len(), PALETTE_SIZE);
            assert!(hexes.iter().all(|h| is_canonical_hex(h)), "{hexes:?}");
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = generate(&mut RngEntropy::seeded(7));
        let b = generate(&mut RngEntropy::seeded(7));
        assert_eq!(a, b);
    }
}
