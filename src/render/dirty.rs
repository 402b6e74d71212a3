use crate::foundation::core::Rect;

/// Value a block counter is set to when it is drawn over.
pub const DIRTY_MARK: u8 = 2;

/// Per-block redraw counters over the front layer.
///
/// A mark sets the counter to [`DIRTY_MARK`]; every incremental present decrements it, so a
/// block is re-sent on two consecutive presents after its last write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyGrid {
    cols: usize,
    rows: usize,
    block_w: usize,
    block_h: usize,
    counters: Vec<u8>,
}

impl DirtyGrid {
    /// Clean grid covering `width` by `height` pixels in `block_w` by `block_h` blocks.
    pub fn new(width: usize, height: usize, block_w: usize, block_h: usize) -> Self {
        let cols = width.div_ceil(block_w.max(1));
        let rows = height.div_ceil(block_h.max(1));
        Self {
            cols,
            rows,
            block_w: block_w.max(1),
            block_h: block_h.max(1),
            counters: vec![0; cols * rows],
        }
    }

    /// Same block size over a `width` by `height` screen, every counter clean.
    pub fn resized(&self, width: usize, height: usize) -> Self {
        Self::new(width, height, self.block_w, self.block_h)
    }

    /// Block columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Block rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Counter of block `(col, row)`; 0 outside the grid.
    pub fn counter(&self, col: usize, row: usize) -> u8 {
        self.counters.get(row * self.cols + col).copied().unwrap_or(0)
    }

    /// Mark every block touched by `rect`. Parts outside the grid are ignored.
    pub fn mark(&mut self, rect: Rect) {
        let bounds = Rect::new(
            0,
            0,
            (self.cols * self.block_w) as i32,
            (self.rows * self.block_h) as i32,
        );
        let Some(r) = rect.intersect(bounds) else {
            return;
        };
        let (bx0, by0) = (r.x as usize / self.block_w, r.y as usize / self.block_h);
        let (bx1, by1) = (
            (r.right() - 1) as usize / self.block_w,
            (r.bottom() - 1) as usize / self.block_h,
        );
        for by in by0..=by1 {
            self.counters[by * self.cols + bx0..=by * self.cols + bx1].fill(DIRTY_MARK);
        }
    }

    /// Reset every counter.
    pub fn clear(&mut self) {
        self.counters.fill(0);
    }

    /// No block is waiting to be sent.
    pub fn is_clean(&self) -> bool {
        self.counters.iter().all(|&c| c == 0)
    }

    /// Pixel rectangles of the dirty blocks, coalesced into horizontal runs per block row.
    pub fn dirty_rects(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            let line = &self.counters[row * self.cols..(row + 1) * self.cols];
            let mut col = 0;
            while col < line.len() {
                if line[col] == 0 {
                    col += 1;
                    continue;
                }
                let first = col;
                while col < line.len() && line[col] != 0 {
                    col += 1;
                }
                out.push(self.block_rect(first, row, col - first));
            }
        }
        out
    }

    /// Like [`DirtyGrid::dirty_rects`], then decrement every nonzero counter.
    pub fn take_runs(&mut self) -> Vec<Rect> {
        let rects = self.dirty_rects();
        for c in &mut self.counters {
            *c = c.saturating_sub(1);
        }
        rects
    }

    fn block_rect(&self, col: usize, row: usize, len: usize) -> Rect {
        Rect::new(
            (col * self.block_w) as i32,
            (row * self.block_h) as i32,
            (len * self.block_w) as i32,
            self.block_h as i32,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dirty.rs"]
mod tests;
