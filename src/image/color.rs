use std::fmt;

use image::RgbImage;

/// Bins per channel of the dominant-colour histogram.
const BINS: usize = 16;
/// Channel values covered by one bin.
const BIN_WIDTH: usize = 256 / BINS;

/// An sRGB colour sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// CSS functional notation: `rgb(r, g, b)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Most frequent colour of an image.
///
/// Pixels are counted in a 16×16×16 RGB histogram; the fullest bin wins
/// (lowest index on ties) and is reported as its centre value. An empty
/// image yields the centre of the first bin.
pub fn dominant_color(img: &RgbImage) -> Rgb {
    let mut histogram = vec![0u32; BINS * BINS * BINS];
    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        histogram[bin_index(r, g, b)] += 1;
    }

    let mut best = 0;
    for (index, &count) in histogram.iter().enumerate() {
        if count > histogram[best] {
            best = index;
        }
    }

    Rgb::new(
        bin_centre(best / (BINS * BINS)),
        bin_centre((best / BINS) % BINS),
        bin_centre(best % BINS),
    )
}

#[inline]
fn bin_index(r: u8, g: u8, b: u8) -> usize {
    let bin = |c: u8| c as usize / BIN_WIDTH;
    (bin(r) * BINS + bin(g)) * BINS + bin(b)
}

#[inline]
#[allow(clippy::cast_possible_truncation)] // bin < 16, centre < 256
fn bin_centre(bin: usize) -> u8 {
    (bin * BIN_WIDTH + BIN_WIDTH / 2) as u8
}
