use crate::{
    decode::Bitmap,
    foundation::{
        core::{Rect, Rgb},
        error::EngineResult,
    },
    render::dirty::DirtyGrid,
};

/// Display collaborator fed by [`Presenter`].
///
/// Ordering contract: within one present, every `copy_rect` is issued before the single
/// `present` call.
pub trait DisplaySink {
    /// Copy `rect` of `layer` to the display's back buffer.
    fn copy_rect(&mut self, rect: Rect, layer: &Bitmap) -> EngineResult<()>;
    /// Show the back buffer, shifted down by `shake` pixels.
    fn present(&mut self, shake: i32) -> EngineResult<()>;
    /// Set palette entry `index` to `color`.
    fn set_palette_entry(&mut self, index: u8, color: Rgb) -> EngineResult<()>;
    /// The layers were reallocated at `width` by `height`; the next present is a full refresh.
    fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        let _ = (width, height);
        Ok(())
    }
}

/// Whether the next present sends the whole frame or only dirty blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentState {
    /// Next present sends the whole front layer.
    FullRefresh,
    /// Next present sends only dirty blocks.
    Incremental,
}

/// What one present sent to the sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentReport {
    /// Rectangles copied to the sink, in order.
    pub rects: Vec<Rect>,
    /// Whether the sink was asked to present.
    pub presented: bool,
}

/// Frame present state machine.
#[derive(Clone, Debug)]
pub struct Presenter {
    state: PresentState,
    shake: i32,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    /// Presenter whose first present is a full refresh.
    pub fn new() -> Self {
        Self {
            state: PresentState::FullRefresh,
            shake: 0,
        }
    }

    /// Mode of the next present.
    pub fn state(&self) -> PresentState {
        self.state
    }

    /// Pending vertical offset.
    pub fn shake(&self) -> i32 {
        self.shake
    }

    /// Vertical offset for the next present only.
    pub fn set_shake(&mut self, shake: i32) {
        self.shake = shake;
    }

    /// Send the whole front layer on the next present and forget the dirty blocks.
    pub fn request_full_refresh(&mut self, grid: &mut DirtyGrid) {
        self.state = PresentState::FullRefresh;
        grid.clear();
    }

    /// Send the front layer to `sink` according to the current state.
    pub fn present<S: DisplaySink + ?Sized>(
        &mut self,
        front: &Bitmap,
        grid: &mut DirtyGrid,
        sink: &mut S,
    ) -> EngineResult<PresentReport> {
        let report = match self.state {
            PresentState::FullRefresh => {
                let all = Rect::new(0, 0, front.width as i32, front.height as i32);
                sink.copy_rect(all, front)?;
                sink.present(self.shake)?;
                grid.clear();
                self.state = PresentState::Incremental;
                PresentReport {
                    rects: vec![all],
                    presented: true,
                }
            }
            PresentState::Incremental => {
                let rects = grid.take_runs();
                for &r in &rects {
                    sink.copy_rect(r, front)?;
                }
                let presented = !rects.is_empty();
                if presented {
                    sink.present(self.shake)?;
                }
                PresentReport { rects, presented }
            }
        };
        tracing::trace!(
            rects = report.rects.len(),
            presented = report.presented,
            shake = self.shake,
            "present"
        );
        if self.shake != 0 {
            self.shake = 0;
            self.request_full_refresh(grid);
        }
        Ok(report)
    }
}

/// One call received by a [`RecordingSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// [`DisplaySink::copy_rect`].
    CopyRect(Rect),
    /// [`DisplaySink::present`] with its shake.
    Present(i32),
    /// [`DisplaySink::set_palette_entry`].
    Palette(u8, Rgb),
    /// [`DisplaySink::resize`] with the new width and height.
    Resize(usize, usize),
}

/// Sink that records calls, for tests and debugging.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Sink with no recorded events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since the last clear.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Rectangles copied since the last clear, in order.
    pub fn rects(&self) -> Vec<Rect> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::CopyRect(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Number of presents since the last clear.
    pub fn presents(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Present(_)))
            .count()
    }

    /// Forget the recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DisplaySink for RecordingSink {
    fn copy_rect(&mut self, rect: Rect, _layer: &Bitmap) -> EngineResult<()> {
        self.events.push(SinkEvent::CopyRect(rect));
        Ok(())
    }

    fn present(&mut self, shake: i32) -> EngineResult<()> {
        self.events.push(SinkEvent::Present(shake));
        Ok(())
    }

    fn set_palette_entry(&mut self, index: u8, color: Rgb) -> EngineResult<()> {
        self.events.push(SinkEvent::Palette(index, color));
        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        self.events.push(SinkEvent::Resize(width, height));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/present.rs"]
mod tests;
