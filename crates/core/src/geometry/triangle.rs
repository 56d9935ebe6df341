use std::fmt;

use serde_json::Value;

use super::{finite_json, Point, Rectangle};
use crate::error::{AppError, Result};

/// Names the three corners of a selection triangle.
///
/// A freshly reset selection spans the full image as
/// `TopLeft (0, 0)`, `TopRight (w, 0)`, `BottomRight (w, h)`: the right angle
/// sits at `TopRight`, which shares its y with `TopLeft` and its x with
/// `BottomRight`. The names describe that starting layout; once the user
/// drags handles the corners can be anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 3] = [Corner::TopLeft, Corner::TopRight, Corner::BottomRight];

    /// Position in the serialized point array.
    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
        }
    }
}

/// A mutable triangle of three ordered points.
///
/// Nothing here checks that the triangle is right-angled; the selector keeps
/// that convention and the square transform relies on it only through the
/// bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
}

impl Triangle {
    pub const fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Self { p0, p1, p2 }
    }

    /// The default selection over an image of the given size:
    /// `(0, 0), (width, 0), (width, height)`.
    pub fn spanning(width: f64, height: f64) -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
        )
    }

    /// Constructs a triangle from an untrusted array of three `{x, y}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataValidation`] if the data is not an array of
    /// at least three points or any point fails validation.
    pub fn from_data(data: &Value) -> Result<Self> {
        let points = data
            .as_array()
            .filter(|points| points.len() >= 3)
            .ok_or_else(|| AppError::data("Triangle", "must have 3 points"))?;

        Ok(Self::new(
            Point::from_data(&points[0])?,
            Point::from_data(&points[1])?,
            Point::from_data(&points[2])?,
        ))
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.p0,
            Corner::TopRight => self.p1,
            Corner::BottomRight => self.p2,
        }
    }

    pub fn corner_mut(&mut self, corner: Corner) -> &mut Point {
        match corner {
            Corner::TopLeft => &mut self.p0,
            Corner::TopRight => &mut self.p1,
            Corner::BottomRight => &mut self.p2,
        }
    }

    pub fn points(&self) -> [Point; 3] {
        [self.p0, self.p1, self.p2]
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> {
        self.points().into_iter()
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut Point)) {
        f(&mut self.p0);
        f(&mut self.p1);
        f(&mut self.p2);
    }

    pub fn move_by(&mut self, amount: f64) {
        self.for_each_mut(|p| p.move_by(amount));
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.for_each_mut(|p| p.translate(x, y));
    }

    pub fn scale(&mut self, amount: f64) {
        self.for_each_mut(|p| p.scale(amount));
    }

    /// Returns a copy of this triangle scaled about the origin.
    pub fn scaled(mut self, amount: f64) -> Self {
        self.scale(amount);
        self
    }

    /// Signed area (shoelace formula); positive for clockwise points in
    /// screen coordinates.
    pub fn area(&self) -> f64 {
        cross(self.p1 - self.p0, self.p2 - self.p0) / 2.0
    }

    /// Barycentric coordinates `(s, t)` of `point` relative to `p0`, along
    /// the edges to `p1` and `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DegenerateGeometry`] for a zero-area triangle.
    pub fn barycentric(&self, point: Point) -> Result<(f64, f64)> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let denominator = cross(e1, e2);
        if denominator == 0.0 || !denominator.is_finite() {
            return Err(AppError::DegenerateGeometry);
        }

        let offset = point - self.p0;
        Ok((cross(offset, e2) / denominator, cross(e1, offset) / denominator))
    }

    /// Boundary-inclusive containment test.
    ///
    /// A zero-area triangle contains nothing.
    pub fn contains(&self, point: Point) -> bool {
        match self.barycentric(point) {
            Ok((s, t)) => (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) && s + t <= 1.0,
            Err(_) => false,
        }
    }

    pub fn bounding_rectangle(&self) -> Rectangle {
        let x = self.p0.x.min(self.p1.x).min(self.p2.x);
        let y = self.p0.y.min(self.p1.y).min(self.p2.y);
        let right = self.p0.x.max(self.p1.x).max(self.p2.x);
        let bottom = self.p0.y.max(self.p1.y).max(self.p2.y);

        Rectangle::new(x, y, right - x, bottom - y)
    }

    /// Side of the square this triangle is deformed into:
    /// `min(bounding width, bounding height)`.
    pub fn squared_size(&self) -> f64 {
        let bounds = self.bounding_rectangle();
        bounds.width.min(bounds.height)
    }

    /// The right isosceles triangle `(0, 0), (size, 0), (size, size)` offset by
    /// `anchor`, where `size` is [`squared_size`](Self::squared_size).
    pub fn squared_at(&self, anchor: Point) -> Triangle {
        let size = self.squared_size();
        Triangle::new(
            anchor,
            anchor + Point::new(size, 0.0),
            anchor + Point::new(size, size),
        )
    }

    pub fn squared(&self) -> Triangle {
        self.squared_at(Point::ORIGIN)
    }

    /// Compact JSON form, an array of three `{x, y}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataValidation`] if any coordinate is not finite;
    /// such a triangle could not be read back.
    pub fn to_data(&self) -> Result<String> {
        let coordinates: Vec<f64> = self.iter().flat_map(|p| [p.x, p.y]).collect();
        finite_json(&self.points(), &coordinates, "Triangle")
    }
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Triangle[{}, {}, {}]", self.p0, self.p1, self.p2)
    }
}
