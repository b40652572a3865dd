//! Dominant-color quantization (modified median cut).
//!
//! Pixels are bucketed into a 5-bit-per-channel histogram. Boxes in that
//! color cube are repeatedly split along their widest axis near the population
//! median: first by population alone until 75% of the requested count is
//! reached, then by population × volume. Each box reports the mean of the real
//! pixel values that fell into it.
//!
//! A box covering a single histogram cell is never split, so an image with
//! only a few distinct colors yields only that many colors.

use std::cmp::Reverse;
use std::fmt;

use crate::color::Color;

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const SIDE: usize = 1 << SIGBITS;
const MAX_ITERATIONS: usize = 1000;

/// Reduces pixel data to a small set of representative colors.
pub trait Quantizer: fmt::Debug {
    /// At most `max_colors` colors, most dominant first.
    fn quantize(&self, pixels: &[Color], max_colors: usize) -> Vec<Color>;
}

/// Modified median cut quantizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, pixels: &[Color], max_colors: usize) -> Vec<Color> {
        if pixels.is_empty() || max_colors == 0 {
            return Vec::new();
        }

        let histogram = Histogram::from_pixels(pixels);
        let Some(root) = ColorBox::fit(&histogram, [0; 3], [SIDE - 1; 3]) else {
            return Vec::new();
        };

        let mut boxes = vec![root];
        // ceil(0.75 * max_colors)
        let population_target = (max_colors * 3).div_ceil(4);
        split_until(&mut boxes, &histogram, population_target, |b| b.count);
        split_until(&mut boxes, &histogram, max_colors, |b| {
            b.count.saturating_mul(b.volume())
        });

        boxes.sort_by_key(|b| Reverse(b.count.saturating_mul(b.volume())));
        boxes.iter().map(|b| b.average(&histogram)).collect()
    }
}

/// Split the highest-priority splittable box until `target` boxes exist or
/// nothing more can be split.
fn split_until(
    boxes: &mut Vec<ColorBox>,
    histogram: &Histogram,
    target: usize,
    priority: impl Fn(&ColorBox) -> u64,
) {
    for _ in 0..MAX_ITERATIONS {
        if boxes.len() >= target {
            return;
        }
        let Some(pos) = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_splittable())
            .max_by_key(|(_, b)| priority(b))
            .map(|(i, _)| i)
        else {
            return;
        };

        let candidate = boxes.swap_remove(pos);
        match candidate.split(histogram) {
            Some((left, right)) => {
                boxes.push(left);
                boxes.push(right);
            }
            None => {
                boxes.push(candidate);
                return;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    count: u64,
    sum: [u64; 3],
}

struct Histogram {
    bins: Vec<Bin>,
}

impl Histogram {
    fn from_pixels(pixels: &[Color]) -> Self {
        let mut bins = vec![Bin::default(); SIDE * SIDE * SIDE];
        for pixel in pixels {
            let cell = [
                usize::from(pixel.r >> RSHIFT),
                usize::from(pixel.g >> RSHIFT),
                usize::from(pixel.b >> RSHIFT),
            ];
            if let Some(bin) = bins.get_mut(cell_index(cell)) {
                bin.count += 1;
                for (total, channel) in bin.sum.iter_mut().zip(pixel.to_array()) {
                    *total += u64::from(channel);
                }
            }
        }
        Self { bins }
    }

    fn count(&self, cell: [usize; 3]) -> u64 {
        self.bins.get(cell_index(cell)).map_or(0, |bin| bin.count)
    }

    fn bin(&self, cell: [usize; 3]) -> Option<&Bin> {
        self.bins.get(cell_index(cell))
    }
}

const fn cell_index([r, g, b]: [usize; 3]) -> usize {
    (r << (2 * SIGBITS)) | (g << SIGBITS) | b
}

fn axis_value(v: [usize; 3], axis: usize) -> usize {
    v.get(axis).copied().unwrap_or_default()
}

fn with_axis(mut v: [usize; 3], axis: usize, value: usize) -> [usize; 3] {
    if let Some(slot) = v.get_mut(axis) {
        *slot = value;
    }
    v
}

/// An axis-aligned box in the 5-bit color cube, always shrunk to the
/// populated cells it contains.
#[derive(Debug, Clone, Copy)]
struct ColorBox {
    lo: [usize; 3],
    hi: [usize; 3],
    count: u64,
}

impl ColorBox {
    /// Tight box around the populated cells within `lo..=hi`, if any.
    fn fit(histogram: &Histogram, lo: [usize; 3], hi: [usize; 3]) -> Option<Self> {
        let mut min = [SIDE; 3];
        let mut max = [0; 3];
        let mut count = 0;
        for_each_cell(lo, hi, |cell| {
            let n = histogram.count(cell);
            if n > 0 {
                count += n;
                for ((low, high), v) in min.iter_mut().zip(max.iter_mut()).zip(cell) {
                    *low = (*low).min(v);
                    *high = (*high).max(v);
                }
            }
        });
        (count > 0).then_some(Self {
            lo: min,
            hi: max,
            count,
        })
    }

    fn width(&self, axis: usize) -> usize {
        axis_value(self.hi, axis) - axis_value(self.lo, axis) + 1
    }

    fn volume(&self) -> u64 {
        (0..3)
            .map(|axis| u64::try_from(self.width(axis)).unwrap_or(u64::MAX))
            .product()
    }

    fn is_splittable(&self) -> bool {
        self.volume() > 1
    }

    fn split(&self, histogram: &Histogram) -> Option<(Self, Self)> {
        let axis = (0..3).max_by_key(|&axis| self.width(axis))?;
        let lo = axis_value(self.lo, axis);
        let hi = axis_value(self.hi, axis);
        if hi <= lo {
            return None;
        }

        let mut planes = vec![0u64; hi - lo + 1];
        for_each_cell(self.lo, self.hi, |cell| {
            if let Some(plane) = planes.get_mut(axis_value(cell, axis) - lo) {
                *plane += histogram.count(cell);
            }
        });

        // First plane where the running population passes half the box
        let mut running = 0;
        let median = planes
            .iter()
            .position(|&n| {
                running += n;
                running * 2 > self.count
            })
            .map_or(lo, |offset| lo + offset);

        // Cut toward the middle of the longer side, keeping both halves non-empty
        let left = median - lo;
        let right = hi - median;
        let cut = if left <= right {
            (median + right / 2).min(hi - 1)
        } else {
            median.saturating_sub(1 + left / 2).max(lo)
        };

        let left_box = Self::fit(histogram, self.lo, with_axis(self.hi, axis, cut))?;
        let right_box = Self::fit(histogram, with_axis(self.lo, axis, cut + 1), self.hi)?;
        Some((left_box, right_box))
    }

    fn average(&self, histogram: &Histogram) -> Color {
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for_each_cell(self.lo, self.hi, |cell| {
            if let Some(bin) = histogram.bin(cell) {
                count += bin.count;
                for (total, part) in sum.iter_mut().zip(bin.sum) {
                    *total += part;
                }
            }
        });
        let mean = |total: u64| {
            let rounded = (total + count / 2) / count.max(1);
            u8::try_from(rounded).unwrap_or(u8::MAX)
        };
        let [r, g, b] = sum;
        Color::new(mean(r), mean(g), mean(b))
    }
}

fn for_each_cell(lo: [usize; 3], hi: [usize; 3], mut f: impl FnMut([usize; 3])) {
    let [r0, g0, b0] = lo;
    let [r1, g1, b1] = hi;
    for r in r0..=r1 {
        for g in g0..=g1 {
            for b in b0..=b1 {
                f([r, g, b]);
            }
        }
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

    fn repeat(color: Color, n: usize) -> Vec<Color> {
        vec![color; n]
    }

    #[test]
    fn test_empty_input() {
        assert!(MedianCut.quantize(&[], 6).is_empty());
        assert!(MedianCut.quantize(&[Color::BLACK], 0).is_empty());
    }

    #[test]
    fn test_single_color_is_exact() {
        let teal = Color::new(20, 184, 166);
        assert_eq!(MedianCut.quantize(&repeat(teal, 40), 6), vec![teal]);
    }

    #[test]
    fn test_never_returns_more_than_distinct_colors() {
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        let mut pixels = repeat(red, 60);
        pixels.extend(repeat(blue, 40));

        let colors = MedianCut.quantize(&pixels, 6);
        assert_eq!(colors, vec![red, blue]);
    }

    #[test]
    fn test_respects_max_colors() {
        // 64 well separated colors, one pixel each
        let pixels: Vec<Color> = (0..4u8)
            .flat_map(|r| (0..4u8).flat_map(move |g| (0..4u8).map(move |b| (r, g, b))))
            .map(|(r, g, b)| Color::new(r * 80, g * 80, b * 80))
            .collect();
        for max in [2, 5, 6, 10] {
            assert_eq!(MedianCut.quantize(&pixels, max).len(), max);
        }
    }

    #[test]
    fn test_dominant_color_first() {
        let mut pixels = repeat(Color::new(200, 30, 30), 10);
        pixels.extend(repeat(Color::new(30, 30, 200), 90));
        let colors = MedianCut.quantize(&pixels, 6);
        assert_eq!(colors.first(), Some(&Color::new(30, 30, 200)));
    }

    #[test]
    fn test_box_average_uses_real_pixels() {
        // Same 5-bit cell, different real values
        let pixels = [Color::new(64, 64, 64), Color::new(66, 66, 66)];
        assert_eq!(MedianCut.quantize(&pixels, 2), vec![Color::new(65, 65, 65)]);
    }

    #[test]
    fn test_split_keeps_both_halves_populated() {
        let pixels = [
            Color::new(0, 0, 0),
            Color::new(0, 0, 0),
            Color::new(0, 0, 0),
            Color::new(255, 0, 0),
        ];
        let histogram = Histogram::from_pixels(&pixels);
        let root = ColorBox::fit(&histogram, [0; 3], [SIDE - 1; 3]).unwrap();
        let (left, right) = root.split(&histogram).unwrap();
        assert_eq!(left.count + right.count, 4);
        assert!(!left.is_splittable());
        assert!(!right.is_splittable());
    }
}
