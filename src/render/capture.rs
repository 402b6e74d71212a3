use std::path::Path;

use anyhow::Context;

use crate::{
    decode::Bitmap,
    foundation::{
        core::{Rect, Rgb},
        error::EngineResult,
    },
    render::present::DisplaySink,
};

/// Display sink that keeps the presented indexed frame and palette, and converts them to RGBA.
#[derive(Clone, Debug)]
pub struct CaptureSink {
    screen: Bitmap,
    palette: [Rgb; 256],
    presents: usize,
    last_shake: i32,
}

impl CaptureSink {
    /// Black sink of `width` by `height`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            screen: Bitmap::filled(width, height, 0),
            palette: [Rgb::BLACK; 256],
            presents: 0,
            last_shake: 0,
        }
    }

    /// Indexed pixels received so far.
    pub fn screen(&self) -> &Bitmap {
        &self.screen
    }

    /// Palette entries received so far.
    pub fn palette(&self) -> &[Rgb; 256] {
        &self.palette
    }

    /// Number of presents.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// Shake of the latest present.
    pub fn last_shake(&self) -> i32 {
        self.last_shake
    }

    /// Resolve the captured frame through the palette.
    pub fn to_rgba(&self) -> image::RgbaImage {
        let (w, h) = (self.screen.width as u32, self.screen.height as u32);
        image::RgbaImage::from_fn(w, h, |x, y| {
            let idx = self.screen.pixels[y as usize * self.screen.width + x as usize];
            let c = self.palette[usize::from(idx)];
            image::Rgba([c.r, c.g, c.b, 255])
        })
    }

    /// Write [`CaptureSink::to_rgba`] to `path` as a PNG.
    pub fn save_png(&self, path: &Path) -> EngineResult<()> {
        self.to_rgba()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

impl DisplaySink for CaptureSink {
    fn copy_rect(&mut self, rect: Rect, layer: &Bitmap) -> EngineResult<()> {
        let bounds = Rect::new(0, 0, self.screen.width as i32, self.screen.height as i32);
        let src_bounds = Rect::new(0, 0, layer.width as i32, layer.height as i32);
        let Some(r) = rect.intersect(bounds).and_then(|r| r.intersect(src_bounds)) else {
            return Ok(());
        };
        let (x, w) = (r.x as usize, r.w as usize);
        for y in r.y as usize..r.bottom() as usize {
            let dst = y * self.screen.width + x;
            let src = y * layer.width + x;
            self.screen.pixels[dst..dst + w].copy_from_slice(&layer.pixels[src..src + w]);
        }
        Ok(())
    }

    fn present(&mut self, shake: i32) -> EngineResult<()> {
        self.presents += 1;
        self.last_shake = shake;
        Ok(())
    }

    fn set_palette_entry(&mut self, index: u8, color: Rgb) -> EngineResult<()> {
        self.palette[usize::from(index)] = color;
        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        if (self.screen.width, self.screen.height) != (width, height) {
            self.screen = Bitmap::filled(width, height, 0);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/capture.rs"]
mod tests;
