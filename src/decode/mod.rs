//! Pure decoders from per-family asset bytes to 8-bit indexed pixels.

/// Decoder capability selected once per asset family.
pub mod family;
/// Nibble colour conversion and palette slot helpers.
pub mod palette;
/// Bitplane and nibble decoders.
pub mod planar;
/// Compact and map run-length streams.
pub mod rle;
/// Room layouts and tile maps.
pub mod room;
/// Masked multi-tile scenes.
pub mod scene;

/// Row-major 8-bit indexed image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    /// Pixels per row.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// `width * height` indices.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Image over `pixels`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Blank image.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    /// Pixels of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }
}
