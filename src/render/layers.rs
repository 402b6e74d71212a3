use crate::decode::Bitmap;

/// The four equally sized indexed framebuffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layers {
    /// Composited frame sent to the display.
    pub front: Bitmap,
    /// Pristine room background used to erase moving sprites.
    pub back: Bitmap,
    /// Scratch layer for callers.
    pub temp: Bitmap,
    /// Second scratch layer.
    pub temp2: Bitmap,
}

impl Layers {
    /// Four blank layers of `width` by `height`.
    pub fn new(width: usize, height: usize) -> Self {
        let blank = Bitmap::filled(width, height, 0);
        Self {
            front: blank.clone(),
            back: blank.clone(),
            temp: blank.clone(),
            temp2: blank,
        }
    }

    /// Width shared by every layer.
    pub fn width(&self) -> usize {
        self.front.width
    }

    /// Height shared by every layer.
    pub fn height(&self) -> usize {
        self.front.height
    }

    /// Reallocate all four layers at `width` by `height`, blank. A no-op when the size is
    /// unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width() != width || self.height() != height {
            *self = Self::new(width, height);
        }
    }

    /// Fill the front layer with index 0.
    pub fn clear_front(&mut self) {
        self.front.pixels.fill(0);
    }

    /// Snapshot the freshly decoded room into the back layer.
    pub fn save_background(&mut self) {
        self.back.pixels.copy_from_slice(&self.front.pixels);
    }

    /// Erase everything drawn since the last [`Layers::save_background`].
    pub fn restore_background(&mut self) {
        self.front.pixels.copy_from_slice(&self.back.pixels);
    }

    /// Copy `src` into the front layer at the origin, clipped to the layer.
    pub fn put_front(&mut self, src: &Bitmap) {
        let w = src.width.min(self.front.width);
        for y in 0..src.height.min(self.front.height) {
            let at = y * self.front.width;
            self.front.pixels[at..at + w].copy_from_slice(&src.row(y)[..w]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
