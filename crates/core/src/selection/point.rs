use crate::geometry::{Circle, Point, Size};

/// Radius of a selection handle, in display pixels.
pub const POINT_RADIUS: f64 = 7.0;

/// A draggable triangle corner.
///
/// `position` is what is displayed and sampled; it always lies inside the
/// image. `true_position` accumulates raw pointer movement during a drag and
/// may leave the image, so a handle dragged out and back resumes moving as
/// soon as the pointer re-enters instead of lagging behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPoint {
    position: Point,
    true_position: Point,
}

impl SelectionPoint {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            true_position: position,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn true_position(&self) -> Point {
        self.true_position
    }

    /// Moves the handle outright, with no clamping.
    pub fn move_to(&mut self, point: Point) {
        self.position = point;
        self.finalize_position();
    }

    /// Makes the displayed position the new true position.
    pub fn finalize_position(&mut self) {
        self.true_position = self.position;
    }

    /// Accumulates a drag delta and re-derives the displayed position by
    /// clamping the true position to `bounds` on each axis.
    pub fn translate_within(&mut self, x: f64, y: f64, bounds: Size) {
        self.true_position.translate(x, y);
        self.position = Point::new(
            self.true_position.x.clamp(0.0, bounds.width),
            self.true_position.y.clamp(0.0, bounds.height),
        );
    }

    /// Sets the displayed position from the true position plus an offset.
    pub(crate) fn show_offset(&mut self, x: f64, y: f64, bounds: Size) {
        self.position = Point::new(
            (self.true_position.x + x).clamp(0.0, bounds.width),
            (self.true_position.y + y).clamp(0.0, bounds.height),
        );
    }

    pub(crate) fn shift_true(&mut self, x: f64, y: f64) {
        self.true_position.translate(x, y);
    }

    /// The hit circle in true image space. Handles are drawn with a fixed
    /// display radius, so the radius here grows as the display shrinks.
    pub fn hit_circle(&self, document_scale: f64) -> Circle {
        Circle::new(self.position.x, self.position.y, POINT_RADIUS / document_scale)
    }

    pub fn contains(&self, point: Point, document_scale: f64) -> bool {
        self.hit_circle(document_scale).contains(point)
    }
}
