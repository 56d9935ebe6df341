//! The eightfold square transform.
//!
//! The sampling triangle picks a window of the source image. The window is
//! stretched independently along each axis so its bounding box becomes a
//! square, clipped to the squared right triangle, and drawn eight times
//! around the origin: four quarter turns, each with a mirrored twin.

use std::sync::Arc;

use tiny_skia::{Color, Path};

use crate::canvas::{triangle_path, CanvasComponent, Surface};
use crate::error::Result;
use crate::geometry::{Point, Rectangle, Triangle};
use crate::image_processing::SourceImage;

/// How far the clip's hypotenuse is pushed outward, in pixels.
///
/// Adjacent copies meet along the hypotenuse; with an exact edge the two
/// anti-aliased clips each cover the seam pixels partially and leave a
/// faint line.
pub const HYPOTENUSE_BLEED: f64 = 0.5;

const GRID_OUTER_WIDTH: f64 = 6.0;
const GRID_INNER_WIDTH: f64 = 2.0;

/// Clips and rotates an image through squared triangles.
pub struct SquareTransform {
    image: Arc<SourceImage>,
    scale_factor: f64,
    show_grid: bool,
    triangle: Option<Triangle>,
}

impl SquareTransform {
    pub fn new(image: Arc<SourceImage>, scale_factor: f64, show_grid: bool) -> Self {
        Self {
            image,
            scale_factor,
            show_grid,
            triangle: None,
        }
    }

    pub fn image(&self) -> &Arc<SourceImage> {
        &self.image
    }

    pub fn triangle(&self) -> Option<Triangle> {
        self.triangle
    }

    /// Replaces the sampling triangle, in true image pixels.
    pub fn set_triangle(&mut self, triangle: Triangle) {
        self.triangle = Some(triangle);
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }

    /// The sampling triangle in the space the tile is drawn in: true image
    /// pixels multiplied by the scale factor.
    fn scaled_triangle(&self) -> Option<Triangle> {
        self.triangle.map(|t| t.scaled(self.scale_factor))
    }

    /// Draws the stretched image so the sampling window lands on the squared
    /// triangle at the current origin.
    fn draw_image(&self, surface: &mut Surface, bounds: &Rectangle) {
        let size = bounds.width.min(bounds.height);
        let scale_horizontal = size / bounds.width;
        let scale_vertical = size / bounds.height;

        let x = bounds.x() * scale_horizontal;
        let y = bounds.y() * scale_vertical;

        let width = self.scale_factor * f64::from(self.image.width()) * scale_horizontal;
        let height = self.scale_factor * f64::from(self.image.height()) * scale_vertical;

        surface.draw_image(self.image.pixmap().as_ref(), -x, -y, width, height);
    }

    /// Draws the full eightfold tile around the surface's current origin.
    ///
    /// Does nothing without a triangle, or when the triangle's bounding box
    /// has no width or height.
    pub fn draw_tile(&self, surface: &mut Surface) -> Result<()> {
        let Some(triangle) = self.scaled_triangle() else {
            return Ok(());
        };
        let bounds = triangle.bounding_rectangle();
        let size = bounds.width.min(bounds.height);
        if !(size > 0.0) {
            return Ok(());
        }

        let Some(clip) = clip_path(size) else {
            return Ok(());
        };
        let outline = triangle_path(&triangle.squared());

        for _ in 0..4 {
            for _ in 0..2 {
                // Undone by the second pass of this loop.
                surface.scale(1.0, -1.0);

                surface.save();
                surface.clip(&clip)?;
                self.draw_image(surface, &bounds);

                if self.show_grid {
                    if let Some(outline) = &outline {
                        surface.stroke_path(outline, GRID_OUTER_WIDTH, Color::BLACK);
                        surface.stroke_path(outline, GRID_INNER_WIDTH, Color::WHITE);
                    }
                }
                surface.restore();
            }

            surface.rotate(90.0);
        }

        Ok(())
    }
}

/// The squared triangle `(0, 0), (size, 0), (size, size)` with its
/// hypotenuse moved outward by [`HYPOTENUSE_BLEED`]. The legs stay exact.
fn clip_path(size: f64) -> Option<Path> {
    triangle_path(&Triangle::new(
        Point::new(-HYPOTENUSE_BLEED, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size + HYPOTENUSE_BLEED),
    ))
}

/// The single layer of a render canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderLayer {
    Tile,
}

impl CanvasComponent<SquareTransform> for RenderLayer {
    fn draw(&self, scene: &SquareTransform, surface: &mut Surface) -> Result<()> {
        scene.draw_tile(surface)
    }

    fn contains(&self, scene: &SquareTransform, point: Point) -> bool {
        let image = scene.image();
        Rectangle::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()))
            .contains(point)
    }
}
