//! Turns a selection triangle into a finished pattern tile.

mod square;

pub use square::{RenderLayer, SquareTransform, HYPOTENUSE_BLEED};

use std::sync::Arc;

use log::debug;
use tiny_skia::Pixmap;

use crate::canvas::{CanvasContainer, Surface};
use crate::error::Result;
use crate::geometry::Triangle;
use crate::image_processing::SourceImage;

/// Owns the square transform and the canvas it renders tiles onto.
pub struct Render {
    canvas: CanvasContainer<RenderLayer>,
    transform: SquareTransform,
}

impl Render {
    pub fn new(image: Arc<SourceImage>, scale_factor: f64, show_grid: bool) -> Result<Self> {
        let mut canvas = CanvasContainer::new(Surface::new(1, 1)?);
        canvas.add_component(RenderLayer::Tile);

        Ok(Self {
            canvas,
            transform: SquareTransform::new(image, scale_factor, show_grid),
        })
    }

    /// Renders one tile for `triangle` (in true image pixels) and returns an
    /// independent snapshot of it.
    ///
    /// The tile is a square of twice the squared size of the scaled
    /// triangle, since each copy fills one eighth of it. Fractional sides
    /// are truncated and the tile is at least one pixel wide.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ResourceExhausted`](crate::AppError::ResourceExhausted)
    /// if the tile is too large to allocate.
    pub fn make_pattern(&mut self, triangle: Triangle) -> Result<Pixmap> {
        self.transform.set_triangle(triangle);

        let size = triangle.scaled(self.transform.scale_factor()).squared_size();
        let side = (size * 2.0).max(1.0).floor();
        debug!("rendering {side}x{side} tile for {triangle}");

        self.canvas.resize(side as u32, side as u32)?;
        self.canvas.translate(size, size);
        self.canvas.draw(&self.transform)?;

        Ok(self.canvas.canvas_snapshot())
    }

    pub fn scale_factor(&self) -> f64 {
        self.transform.scale_factor()
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.transform.set_scale_factor(scale_factor);
    }

    pub fn show_grid(&self) -> bool {
        self.transform.show_grid()
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.transform.set_show_grid(show_grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MAX_SURFACE_DIMENSION;
    use image::{Rgba, RgbaImage};

    fn render(width: u32, height: u32, scale: f64) -> Render {
        let rgba = RgbaImage::from_pixel(width, height, Rgba([10, 120, 220, 255]));
        let image = SourceImage::from_rgba("blue.png", "image/png", &rgba).unwrap();
        Render::new(Arc::new(image), scale, false).unwrap()
    }

    #[test]
    fn tile_is_twice_the_squared_size() {
        let mut r = render(200, 100, 1.0);
        let tile = r.make_pattern(Triangle::spanning(200.0, 100.0)).unwrap();
        assert_eq!((tile.width(), tile.height()), (200, 200));
    }

    #[test]
    fn scale_factor_sizes_tile() {
        let mut r = render(200, 100, 0.5);
        let tile = r.make_pattern(Triangle::spanning(200.0, 100.0)).unwrap();
        assert_eq!(tile.width(), 100);

        r.set_scale_factor(1.5);
        let tile = r.make_pattern(Triangle::spanning(200.0, 100.0)).unwrap();
        assert_eq!(tile.width(), 300);
        assert_eq!(r.scale_factor(), 1.5);
    }

    #[test]
    fn degenerate_triangle_gives_single_pixel() {
        let mut r = render(20, 20, 1.0);
        let flat = Triangle::spanning(20.0, 0.0);
        let tile = r.make_pattern(flat).unwrap();
        assert_eq!((tile.width(), tile.height()), (1, 1));
    }

    #[test]
    fn snapshots_are_independent() {
        let mut r = render(20, 20, 1.0);
        let first = r.make_pattern(Triangle::spanning(20.0, 20.0)).unwrap();
        let second = r.make_pattern(Triangle::spanning(10.0, 10.0)).unwrap();
        assert_eq!(first.width(), 40);
        assert_eq!(second.width(), 20);
    }

    #[test]
    fn oversized_tile_is_resource_exhaustion() {
        let mut r = render(20, 20, f64::from(MAX_SURFACE_DIMENSION));
        let err = r.make_pattern(Triangle::spanning(20.0, 20.0)).err().unwrap();
        assert!(err.is_resource_exhausted());
    }

    #[test]
    fn tile_is_filled() {
        let mut r = render(64, 64, 1.0);
        let tile = r.make_pattern(Triangle::spanning(64.0, 64.0)).unwrap();
        let surface = Surface::from_pixmap(tile);
        assert_eq!(surface.pixel(96, 70).unwrap().alpha(), 255);
        assert_eq!(surface.pixel(5, 120).unwrap().blue(), 220);
    }
}
