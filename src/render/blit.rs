use crate::{
    decode::Bitmap,
    foundation::{
        core::Rect,
        error::{EngineError, EngineResult},
    },
};

/// How sprite pixels are laid out in memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceLayout {
    /// `pixels[row * pitch + col]`.
    #[default]
    RowMajor,
    /// `pixels[col * height + row]`, used by rotated character frames.
    ColumnMajor,
}

/// Whether a blit respects already-final destination pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlitMode {
    /// Write every nonzero source pixel.
    #[default]
    Overwrite,
    /// Skip destination pixels whose top bit is set.
    Occlude,
}

/// Mirroring applied before clipping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Orientation {
    /// Flip columns.
    pub mirror_x: bool,
    /// Flip rows.
    pub mirror_y: bool,
}

impl Orientation {
    /// No mirroring.
    pub const NONE: Orientation = Orientation {
        mirror_x: false,
        mirror_y: false,
    };

    /// Horizontal mirror only.
    pub fn mirrored_x(mirror_x: bool) -> Self {
        Self {
            mirror_x,
            mirror_y: false,
        }
    }
}

/// Borrowed indexed sprite with validated extents.
#[derive(Clone, Copy, Debug)]
pub struct SpriteDescriptor<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
    pitch: usize,
    layout: SourceLayout,
}

impl<'a> SpriteDescriptor<'a> {
    /// Sprite whose rows are exactly `width` bytes apart.
    pub fn new(
        pixels: &'a [u8],
        width: usize,
        height: usize,
        layout: SourceLayout,
    ) -> EngineResult<Self> {
        Self::with_pitch(pixels, width, height, width, layout)
    }

    /// Row-major sprite whose rows are `pitch` bytes apart.
    pub fn with_pitch(
        pixels: &'a [u8],
        width: usize,
        height: usize,
        pitch: usize,
        layout: SourceLayout,
    ) -> EngineResult<Self> {
        let needed = match layout {
            SourceLayout::RowMajor if height > 0 => (height - 1) * pitch + width,
            SourceLayout::ColumnMajor => width * height,
            SourceLayout::RowMajor => 0,
        };
        if pitch < width || pixels.len() < needed {
            return Err(EngineError::size_mismatch(format!(
                "{width}x{height} sprite (pitch {pitch}) needs {needed} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            pitch,
            layout,
        })
    }

    /// Row-major view of `bitmap`.
    pub fn from_bitmap(bitmap: &'a Bitmap) -> EngineResult<Self> {
        Self::new(&bitmap.pixels, bitmap.width, bitmap.height, SourceLayout::RowMajor)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    fn at(&self, col: usize, row: usize) -> u8 {
        match self.layout {
            SourceLayout::RowMajor => self.pixels[row * self.pitch + col],
            SourceLayout::ColumnMajor => self.pixels[col * self.height + row],
        }
    }
}

/// Draw `sprite` with its top-left corner at `(x, y)`.
///
/// The sprite is mirrored first and clipped second, so a mirrored sprite hanging off an edge
/// loses the same screen columns an unmirrored one would. Source value 0 is transparent and
/// `color_mask` is or-ed into every written pixel. Returns the clipped rectangle, or `None`
/// when nothing of the sprite is on screen and `dst` was left untouched.
pub fn blit(
    dst: &mut Bitmap,
    sprite: &SpriteDescriptor<'_>,
    x: i32,
    y: i32,
    orientation: Orientation,
    mode: BlitMode,
    color_mask: u8,
) -> Option<Rect> {
    let bounds = Rect::new(0, 0, dst.width as i32, dst.height as i32);
    let area = Rect::new(x, y, sprite.width as i32, sprite.height as i32).intersect(bounds)?;
    for py in area.y..area.bottom() {
        let row = (py - y) as usize;
        let sy = if orientation.mirror_y {
            sprite.height - 1 - row
        } else {
            row
        };
        let line = py as usize * dst.width;
        for px in area.x..area.right() {
            let col = (px - x) as usize;
            let sx = if orientation.mirror_x {
                sprite.width - 1 - col
            } else {
                col
            };
            let color = sprite.at(sx, sy);
            if color == 0 {
                continue;
            }
            let d = &mut dst.pixels[line + px as usize];
            if mode == BlitMode::Occlude && *d & 0x80 != 0 {
                continue;
            }
            *d = color | color_mask;
        }
    }
    tracing::trace!(x = area.x, y = area.y, w = area.w, h = area.h, ?mode, "blit");
    Some(area)
}

#[cfg(test)]
#[path = "../../tests/unit/render/blit.rs"]
mod tests;
