use crate::foundation::bytes::ByteOrder;

/// Historical asset family. Chosen once at startup; it drives byte order and pixel encoding.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum AssetFamily {
    /// Bitplane graphics, big-endian tables.
    Planar,
    /// Nibble-packed indexed graphics, little-endian tables.
    #[default]
    Nibble,
}

impl AssetFamily {
    /// Byte order of multi-byte table fields for this family.
    pub fn byte_order(self) -> ByteOrder {
        match self {
            AssetFamily::Planar => ByteOrder::Big,
            AssetFamily::Nibble => ByteOrder::Little,
        }
    }

    /// Short human readable label.
    pub fn label(self) -> &'static str {
        match self {
            AssetFamily::Planar => "planar",
            AssetFamily::Nibble => "nibble",
        }
    }
}

/// 8-bit RGB triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// All channels zero.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Colour from its channels.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Integer rectangle in framebuffer pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Rectangle at `(x, y)` of `w` by `h`.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Either extent is <= 0.
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// One past the last column.
    pub fn right(self) -> i32 {
        self.x + self.w
    }

    /// One past the last row.
    pub fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// Intersection with `other`; `None` when either resulting extent is <= 0.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let r = Rect::new(x0, y0, x1 - x0, y1 - y0);
        if r.is_empty() { None } else { Some(r) }
    }
}
