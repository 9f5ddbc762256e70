//! Arcade RGB332 to target B5G5R5 color conversion

use std::array;
use std::sync::LazyLock;

pub const ARCADE_PALETTE_LEN: usize = 256;

/// Lookup table from every possible arcade color byte to a target color word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLut([u16; 256]);

impl ColorLut {
    fn new() -> Self {
        Self(array::from_fn(|bits| arcade_to_b5g5r5(bits as u8)))
    }

    /// Look up an arcade palette entry. Only the low byte of `color` is significant.
    #[inline]
    #[must_use]
    pub fn get(&self, color: u16) -> u16 {
        self.0[(color & 0xFF) as usize]
    }
}

static COLOR_LUT: LazyLock<ColorLut> = LazyLock::new(ColorLut::new);

/// The process-wide color table. Built on first use and never modified afterwards.
#[must_use]
pub fn table() -> &'static ColorLut {
    &COLOR_LUT
}

/// Convert an arcade color byte (`bbgggrrr`) to a 15-bit target color word (`0bbbbbgggggrrrrr`).
///
/// Red and green are widened by repeating their high bits into the new low bits. Blue is widened
/// as `(b << 3) | (b << 2) | (b >> 1)`, so full blue is 29 rather than 31.
#[inline]
#[must_use]
pub const fn arcade_to_b5g5r5(bits: u8) -> u16 {
    let r = (bits & 7) as u16;
    let r = (r << 2) | (r >> 1);

    let g = ((bits >> 3) & 7) as u16;
    let g = (g << 2) | (g >> 1);

    let b = ((bits >> 6) & 3) as u16;
    let b = (b << 3) | (b << 2) | (b >> 1);

    (b << 10) | (g << 5) | r
}

/// Convert the full arcade palette into target color words, writing one output per input.
pub fn convert_palette(arcade_palette: &[u16; ARCADE_PALETTE_LEN], lut: &ColorLut, out: &mut [u16]) {
    debug_assert!(out.len() >= ARCADE_PALETTE_LEN);

    for (dst, &color) in out.iter_mut().zip(arcade_palette) {
        *dst = lut.get(color);
    }
}
