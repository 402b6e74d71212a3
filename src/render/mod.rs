//! Indexed-colour compositing: clipped sprite blits, dirty-block tracking and frame present.

/// Clipped, mirrored, masked sprite blits.
pub mod blit;
/// Display sink that captures frames as RGBA images.
pub mod capture;
/// Block redraw counters.
pub mod dirty;
/// The four framebuffer layers.
pub mod layers;
/// Display sink contract and the present state machine.
pub mod present;
/// Compositor façade used by the game layer.
pub mod video;
