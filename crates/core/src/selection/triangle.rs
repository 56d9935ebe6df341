use super::point::SelectionPoint;
use crate::geometry::{Corner, Point, Size, Triangle};

/// The three draggable corners of a selection, bound to an image.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTriangle {
    points: [SelectionPoint; 3],
    bounds: Size,
}

impl SelectionTriangle {
    /// The full-image default `(0, 0), (w, 0), (w, h)`.
    pub fn spanning(bounds: Size) -> Self {
        Self::from_triangle(Triangle::spanning(bounds.width, bounds.height), bounds)
    }

    pub fn from_triangle(triangle: Triangle, bounds: Size) -> Self {
        Self {
            points: triangle.points().map(SelectionPoint::new),
            bounds,
        }
    }

    /// The image size handles are clamped to.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// The displayed triangle, in true image pixels.
    pub fn triangle(&self) -> Triangle {
        let [p0, p1, p2] = self.points.map(|p| p.position());
        Triangle::new(p0, p1, p2)
    }

    pub fn point(&self, corner: Corner) -> &SelectionPoint {
        &self.points[corner.index()]
    }

    pub fn contains(&self, point: Point) -> bool {
        self.triangle().contains(point)
    }

    pub fn move_corner_to(&mut self, corner: Corner, point: Point) {
        self.points[corner.index()].move_to(point);
    }

    pub fn drag_corner(&mut self, corner: Corner, x: f64, y: f64) {
        let bounds = self.bounds;
        self.points[corner.index()].translate_within(x, y, bounds);
    }

    /// Drags all three corners together.
    ///
    /// The true positions move by the full delta. The displayed triangle is
    /// the true triangle shifted just enough to keep its bounding box inside
    /// the image, so the shape never deforms against an edge.
    pub fn drag_all(&mut self, x: f64, y: f64) {
        for point in &mut self.points {
            point.shift_true(x, y);
        }

        let [a, b, c] = self.points.map(|p| p.true_position());
        let bounds = Triangle::new(a, b, c).bounding_rectangle();
        let dx = correction(bounds.x(), bounds.right(), self.bounds.width);
        let dy = correction(bounds.y(), bounds.bottom(), self.bounds.height);

        let limit = self.bounds;
        for point in &mut self.points {
            point.show_offset(dx, dy, limit);
        }
    }

    pub fn finalize_corner(&mut self, corner: Corner) {
        self.points[corner.index()].finalize_position();
    }

    pub fn finalize(&mut self) {
        for point in &mut self.points {
            point.finalize_position();
        }
    }
}

/// The shift that moves `[low, high]` back inside `[0, max]`.
fn correction(low: f64, high: f64, max: f64) -> f64 {
    if low < 0.0 {
        -low
    } else if high > max {
        max - high
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Size = Size::new(200.0, 100.0);

    fn inner() -> SelectionTriangle {
        SelectionTriangle::from_triangle(
            Triangle::new(
                Point::new(50.0, 20.0),
                Point::new(150.0, 20.0),
                Point::new(150.0, 80.0),
            ),
            BOUNDS,
        )
    }

    #[test]
    fn spanning_uses_full_image() {
        let selection = SelectionTriangle::spanning(BOUNDS);
        assert_eq!(selection.triangle(), Triangle::spanning(200.0, 100.0));
        assert_eq!(selection.triangle().squared_size(), 100.0);
    }

    #[test]
    fn corner_drag_clamps() {
        let mut selection = SelectionTriangle::spanning(BOUNDS);
        selection.drag_corner(Corner::TopLeft, 250.0, 150.0);
        assert_eq!(selection.point(Corner::TopLeft).position(), Point::new(200.0, 100.0));
        // Other corners are untouched.
        assert_eq!(selection.point(Corner::TopRight).position(), Point::new(200.0, 0.0));
    }

    #[test]
    fn group_drag_keeps_shape() {
        let mut selection = inner();
        selection.drag_all(80.0, 0.0);

        let moved = selection.triangle();
        assert_eq!(moved.p0, Point::new(100.0, 20.0));
        assert_eq!(moved.p1, Point::new(200.0, 20.0));
        assert_eq!(moved.p2, Point::new(200.0, 80.0));

        // Back by 40: the first 30 only cancel the overshoot.
        selection.drag_all(-40.0, 0.0);
        assert_eq!(selection.triangle().p0, Point::new(90.0, 20.0));
    }

    #[test]
    fn group_drag_inside_bounds_is_exact() {
        let mut selection = inner();
        selection.drag_all(-10.0, 5.0);
        assert_eq!(selection.triangle().p0, Point::new(40.0, 25.0));
        assert_eq!(selection.triangle().p2, Point::new(140.0, 85.0));
    }

    #[test]
    fn finalize_resets_true_positions() {
        let mut selection = inner();
        selection.drag_all(0.0, -50.0);
        selection.finalize();
        for corner in Corner::ALL {
            let point = selection.point(corner);
            assert_eq!(point.position(), point.true_position());
        }
        selection.drag_all(0.0, 10.0);
        assert_eq!(selection.triangle().p0.y, 10.0);
    }

    #[test]
    fn contains_uses_displayed_triangle() {
        let selection = inner();
        assert!(selection.contains(Point::new(140.0, 30.0)));
        assert!(!selection.contains(Point::new(60.0, 70.0)));
    }
}
