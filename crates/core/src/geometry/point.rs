use std::fmt;
use std::ops::{Add, Sub};

use serde::Serialize;
use serde_json::Value;

use super::{finite_json, number_field};
use crate::error::Result;

/// A mutable point in 2D space.
///
/// Points are used in three coordinate spaces: page space (pointer events),
/// canvas space (relative to a surface) and true image space (pixels of
/// the source image). Conversions between them are plain translations and
/// uniform scales.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Constructs a point from an untrusted object with numeric `x` and `y`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataValidation`](crate::AppError::DataValidation)
    /// if either field is missing or not a number.
    pub fn from_data(data: &Value) -> Result<Self> {
        const MESSAGE: &str = "x and y must be numbers";
        let x = number_field(data, "x", "Point", MESSAGE)?;
        let y = number_field(data, "y", "Point", MESSAGE)?;
        Ok(Self::new(x, y))
    }

    /// Translates this point by the same amount in both directions.
    pub fn move_by(&mut self, amount: f64) {
        self.translate(amount, amount);
    }

    /// Moves this point onto another.
    pub fn move_to(&mut self, point: Point) {
        *self = point;
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.x += x;
        self.y += y;
    }

    /// Scales this point about the origin.
    pub fn scale(&mut self, amount: f64) {
        self.x *= amount;
        self.y *= amount;
    }

    /// Returns a copy of this point scaled about the origin.
    pub fn scaled(mut self, amount: f64) -> Self {
        self.scale(amount);
        self
    }

    pub fn distance_to(&self, point: Point) -> f64 {
        (self.x - point.x).hypot(self.y - point.y)
    }

    /// The vector from `point` to this point.
    pub fn offset_from(&self, point: Point) -> Point {
        Point::new(self.x - point.x, self.y - point.y)
    }

    /// Compact JSON form, `{"x":..,"y":..}`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataValidation`](crate::AppError::DataValidation)
    /// if a coordinate is not finite.
    pub fn to_data(&self) -> Result<String> {
        finite_json(self, &[self.x, self.y], "Point")
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        self.offset_from(rhs)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translate_and_scale() {
        let mut p = Point::new(2.0, 3.0);
        p.translate(1.0, -1.0);
        assert_eq!(p, Point::new(3.0, 2.0));
        p.scale(2.0);
        assert_eq!(p, Point::new(6.0, 4.0));
        p.move_by(-1.0);
        assert_eq!(p, Point::new(5.0, 3.0));
    }

    #[test]
    fn distance_and_offset() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.offset_from(a), Point::new(3.0, 4.0));
        assert_eq!(a - b, Point::new(-3.0, -4.0));
    }

    #[test]
    fn from_data_requires_numbers() {
        assert_eq!(
            Point::from_data(&json!({"x": 1.5, "y": 2})).unwrap(),
            Point::new(1.5, 2.0)
        );
        assert!(Point::from_data(&json!({"x": 1})).is_err());
        assert!(Point::from_data(&json!({"x": "1", "y": 2})).is_err());
        assert!(Point::from_data(&json!(null)).is_err());
    }

    #[test]
    fn data_round_trip() {
        let p = Point::new(0.1, -1234.5678);
        let value: Value = serde_json::from_str(&p.to_data().unwrap()).unwrap();
        assert_eq!(Point::from_data(&value).unwrap(), p);
    }

    #[test]
    fn non_finite_points_have_no_data() {
        assert!(Point::new(f64::NAN, 0.0).to_data().is_err());
        assert!(Point::new(0.0, f64::INFINITY).to_data().is_err());
    }
}
