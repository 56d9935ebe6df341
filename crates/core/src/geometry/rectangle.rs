use std::fmt;

use serde_json::{json, Value};

use super::{finite_json, number_field, Point};
use crate::error::Result;

/// A mutable axis-aligned rectangle.
///
/// Width and height are expected to be non-negative but this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    pub fn from_data(data: &Value) -> Result<Self> {
        const MESSAGE: &str = "must have x, y, width, and height as numbers";
        Ok(Self::new(
            number_field(data, "x", "Rectangle", MESSAGE)?,
            number_field(data, "y", "Rectangle", MESSAGE)?,
            number_field(data, "width", "Rectangle", MESSAGE)?,
            number_field(data, "height", "Rectangle", MESSAGE)?,
        ))
    }

    pub fn x(&self) -> f64 {
        self.origin.x
    }

    pub fn y(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }

    pub fn move_by(&mut self, amount: f64) {
        self.origin.move_by(amount);
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.origin.translate(x, y);
    }

    /// Scales both the position and the size of this rectangle.
    pub fn scale(&mut self, amount: f64) {
        self.origin.scale(amount);
        self.width *= amount;
        self.height *= amount;
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.y >= self.y()
            && point.x <= self.right()
            && point.y <= self.bottom()
    }

    pub fn to_data(&self) -> Result<String> {
        let (x, y) = (self.x(), self.y());
        finite_json(
            &json!({"x": x, "y": y, "width": self.width, "height": self.height}),
            &[x, y, self.width, self.height],
            "Rectangle",
        )
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rectangle{{x: {}, y: {}, width: {}, height: {}}}",
            self.x(),
            self.y(),
            self.width,
            self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contains_is_inclusive() {
        let r = Rectangle::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 15.0)));
        assert!(r.contains(Point::new(20.0, 12.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
        assert!(!r.contains(Point::new(9.9, 12.0)));
    }

    #[test]
    fn scale_moves_and_resizes() {
        let mut r = Rectangle::new(1.0, 2.0, 3.0, 4.0);
        r.scale(2.0);
        assert_eq!(r, Rectangle::new(2.0, 4.0, 6.0, 8.0));
        assert_eq!(r.area(), 48.0);
    }

    #[test]
    fn from_data_accepts_zero_fields() {
        let r = Rectangle::from_data(&json!({"x": 0, "y": 0, "width": 5, "height": 0})).unwrap();
        assert_eq!(r, Rectangle::new(0.0, 0.0, 5.0, 0.0));
        assert!(Rectangle::from_data(&json!({"x": 0, "y": 0, "width": 5})).is_err());
    }

    #[test]
    fn to_data_is_valid_json() {
        let r = Rectangle::new(1.0, 2.5, 3.0, 4.0);
        let value: Value = serde_json::from_str(&r.to_data().unwrap()).unwrap();
        assert_eq!(Rectangle::from_data(&value).unwrap(), r);
    }
}
