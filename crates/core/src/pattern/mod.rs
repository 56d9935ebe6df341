//! Consumers of a finished tile: the on-screen preview and the exporter.

mod preview;
mod save;

pub use preview::PatternPreview;
pub use save::PatternSave;

use tiny_skia::Pixmap;

use crate::canvas::Surface;

/// Something holding a tile that it repeats across a surface.
pub trait PatternDraw {
    fn pattern(&self) -> Option<&Pixmap>;

    /// Fills `surface` with the tile, anchored at the surface's centre so the
    /// tile's eightfold centre lands in the middle of the output.
    fn draw_pattern_on(&self, surface: &mut Surface) {
        if let Some(pattern) = self.pattern() {
            surface.fill_pattern(pattern.as_ref());
        }
    }
}
