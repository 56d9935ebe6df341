//! A raster drawing surface with 2D-canvas style state.
//!
//! [`Surface`] wraps a [`tiny_skia::Pixmap`] and keeps a current transform and
//! clip mask, with a `save`/`restore` stack, so drawing code can be written
//! as a sequence of relative moves (translate, rotate, flip, clip, draw).

use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pattern, Pixmap,
    PixmapPaint, PixmapRef, Rect, SpreadMode, Stroke, Transform,
};

use crate::error::{AppError, Result};
use crate::geometry::{Point, Triangle};

/// Largest width or height a surface may be allocated with.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

#[derive(Clone)]
struct SavedState {
    transform: Transform,
    clip: Option<Mask>,
}

/// A pixmap plus the drawing state applied to everything drawn on it.
pub struct Surface {
    pixmap: Pixmap,
    transform: Transform,
    clip: Option<Mask>,
    stack: Vec<SavedState>,
}

impl Surface {
    /// Allocates a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ResourceExhausted`] if either dimension is zero or
    /// larger than [`MAX_SURFACE_DIMENSION`], or the allocation fails.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self::from_pixmap(allocate(width, height)?))
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap,
            transform: Transform::identity(),
            clip: None,
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reallocates the surface, discarding its content and drawing state.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.pixmap = allocate(width, height)?;
        self.transform = Transform::identity();
        self.clip = None;
        self.stack.clear();
        Ok(())
    }

    /// Wipes every pixel, ignoring the current transform and clip.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform.pre_translate(x as f32, y as f32);
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.transform = self.transform.pre_scale(x as f32, y as f32);
    }

    /// Rotates clockwise (in screen coordinates) by `degrees`.
    pub fn rotate(&mut self, degrees: f64) {
        self.transform = self
            .transform
            .pre_concat(Transform::from_rotate(degrees as f32));
    }

    pub fn save(&mut self) {
        self.stack.push(SavedState {
            transform: self.transform,
            clip: self.clip.clone(),
        });
    }

    /// Restores the most recently saved state. Does nothing if none was saved.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.transform = state.transform;
            self.clip = state.clip;
        }
    }

    /// Intersects the clip region with `path` under the current transform.
    pub fn clip(&mut self, path: &Path) -> Result<()> {
        match &mut self.clip {
            Some(mask) => {
                mask.intersect_path(path, FillRule::Winding, true, self.transform);
            }
            None => {
                let mut mask = Mask::new(self.width(), self.height())
                    .ok_or_else(|| AppError::exhausted("cannot allocate clip mask"))?;
                mask.fill_path(path, FillRule::Winding, true, self.transform);
                self.clip = Some(mask);
            }
        }
        Ok(())
    }

    pub fn fill_path(&mut self, path: &Path, color: Color) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap.fill_path(
            path,
            &paint,
            FillRule::Winding,
            self.transform,
            self.clip.as_ref(),
        );
    }

    pub fn stroke_path(&mut self, path: &Path, width: f64, color: Color) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.transform, self.clip.as_ref());
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        {
            self.fill_path(&path, color);
        }
    }

    /// Draws `image` stretched into the rectangle at `(x, y)` of size
    /// `width` x `height`, in the current coordinate space.
    pub fn draw_image(&mut self, image: PixmapRef, x: f64, y: f64, width: f64, height: f64) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let sx = width / f64::from(image.width());
        let sy = height / f64::from(image.height());
        let transform = self
            .transform
            .pre_translate(x as f32, y as f32)
            .pre_scale(sx as f32, sy as f32);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, image, &paint, transform, self.clip.as_ref());
    }

    /// Fills the whole surface with `tile` repeated in both directions, with a
    /// tile corner anchored at the surface's centre.
    pub fn fill_pattern(&mut self, tile: PixmapRef) {
        let width = self.width() as f32;
        let height = self.height() as f32;
        let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) else {
            return;
        };

        let mut paint = Paint::default();
        paint.shader = Pattern::new(
            tile,
            SpreadMode::Repeat,
            FilterQuality::Nearest,
            1.0,
            Transform::from_translate(width / 2.0, height / 2.0),
        );
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// An independent copy of the current raster content.
    pub fn snapshot(&self) -> Pixmap {
        self.pixmap.clone()
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// The straight-alpha colour of one pixel, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorU8> {
        self.pixmap.pixel(x, y).map(|p| p.demultiply())
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(AppError::exhausted(format!(
            "{width}x{height} exceeds the largest drawable surface of \
             {MAX_SURFACE_DIMENSION}x{MAX_SURFACE_DIMENSION}"
        )));
    }
    Pixmap::new(width, height)
        .ok_or_else(|| AppError::exhausted(format!("cannot allocate a {width}x{height} surface")))
}

/// A closed path through the triangle's three points.
pub fn triangle_path(triangle: &Triangle) -> Option<Path> {
    let mut builder = PathBuilder::new();
    builder.move_to(triangle.p0.x as f32, triangle.p0.y as f32);
    builder.line_to(triangle.p1.x as f32, triangle.p1.y as f32);
    builder.line_to(triangle.p2.x as f32, triangle.p2.y as f32);
    builder.close();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_oversized() {
        assert!(Surface::new(0, 10).is_err());
        let err = Surface::new(MAX_SURFACE_DIMENSION + 1, 1).err().unwrap();
        assert!(err.is_resource_exhausted());
        assert!(Surface::new(4, 4).is_ok());
    }

    #[test]
    fn save_restore_transform() {
        let mut surface = Surface::new(8, 8).unwrap();
        surface.save();
        surface.translate(2.0, 3.0);
        surface.scale(1.0, -1.0);
        assert_ne!(surface.transform(), Transform::identity());
        surface.restore();
        assert_eq!(surface.transform(), Transform::identity());
        surface.restore();
        assert_eq!(surface.transform(), Transform::identity());
    }

    #[test]
    fn clip_limits_fill() {
        let mut surface = Surface::new(10, 10).unwrap();
        let clip = PathBuilder::from_rect(Rect::from_xywh(0.0, 0.0, 5.0, 10.0).unwrap());
        let full = PathBuilder::from_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0).unwrap());
        surface.save();
        surface.clip(&clip).unwrap();
        surface.fill_path(&full, Color::BLACK);
        surface.restore();

        assert_eq!(surface.pixel(2, 5).unwrap().alpha(), 255);
        assert_eq!(surface.pixel(8, 5).unwrap().alpha(), 0);
    }

    #[test]
    fn resize_resets_state() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.translate(1.0, 1.0);
        surface.fill_circle(Point::new(1.0, 1.0), 2.0, Color::WHITE);
        surface.resize(6, 2).unwrap();
        assert_eq!((surface.width(), surface.height()), (6, 2));
        assert_eq!(surface.transform(), Transform::identity());
        assert_eq!(surface.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn pattern_repeats_from_centre() {
        let mut tile = Pixmap::new(2, 2).unwrap();
        tile.fill(Color::TRANSPARENT);
        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        tile.fill_rect(
            Rect::from_xywh(0.0, 0.0, 1.0, 1.0).unwrap(),
            &paint,
            Transform::identity(),
            None,
        );

        let mut surface = Surface::new(6, 6).unwrap();
        surface.fill_pattern(tile.as_ref());
        // The tile's opaque corner lands at the centre and every two pixels.
        assert_eq!(surface.pixel(3, 3).unwrap().alpha(), 255);
        assert_eq!(surface.pixel(1, 1).unwrap().alpha(), 255);
        assert_eq!(surface.pixel(4, 3).unwrap().alpha(), 0);
    }
}
