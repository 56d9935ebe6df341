use std::sync::Arc;

use log::debug;
use tiny_skia::Pixmap;

use super::PatternDraw;
use crate::canvas::Surface;
use crate::error::Result;

/// The live preview, always sized to fill its container.
#[derive(Default)]
pub struct PatternPreview {
    surface: Option<Surface>,
    container: (u32, u32),
    pattern: Option<Arc<Pixmap>>,
    generation: u64,
}

impl PatternPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tile and redraws.
    pub fn set_pattern(&mut self, pattern: Arc<Pixmap>) -> Result<()> {
        self.pattern = Some(pattern);
        self.draw()
    }

    pub fn clear_pattern(&mut self) {
        self.pattern = None;
        self.surface = None;
        self.generation += 1;
    }

    /// Records the container's size and redraws to fill it.
    pub fn resize_to_container(&mut self, width: u32, height: u32) -> Result<()> {
        if self.container == (width, height) && self.surface.is_some() {
            return Ok(());
        }
        self.container = (width, height);
        self.draw()
    }

    /// Reallocates the surface at the container size and repeats the tile
    /// over it. An empty container or missing tile leaves no surface.
    pub fn draw(&mut self) -> Result<()> {
        let (width, height) = self.container;
        if width == 0 || height == 0 || self.pattern.is_none() {
            self.surface = None;
            return Ok(());
        }

        let mut surface = match self.surface.take() {
            Some(mut surface) => {
                surface.resize(width, height)?;
                surface
            }
            None => Surface::new(width, height)?,
        };
        self.draw_pattern_on(&mut surface);
        self.surface = Some(surface);
        self.generation += 1;

        debug!("preview redrawn at {width}x{height}");
        Ok(())
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Bumped on every redraw.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl PatternDraw for PatternPreview {
    fn pattern(&self) -> Option<&Pixmap> {
        self.pattern.as_deref()
    }
}
