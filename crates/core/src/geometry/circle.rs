use std::f64::consts::PI;
use std::fmt;

use serde_json::{json, Value};

use super::{finite_json, number_field, Point};
use crate::error::Result;

/// A mutable circle, used as the hit area of selection handles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
        }
    }

    pub fn from_data(data: &Value) -> Result<Self> {
        const MESSAGE: &str = "x, y, and radius must be a number";
        Ok(Self::new(
            number_field(data, "x", "Circle", MESSAGE)?,
            number_field(data, "y", "Circle", MESSAGE)?,
            number_field(data, "radius", "Circle", MESSAGE)?,
        ))
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.center.translate(x, y);
    }

    /// Scales the position and the radius.
    pub fn scale(&mut self, amount: f64) {
        self.center.scale(amount);
        self.radius *= amount;
    }

    pub fn area(&self) -> f64 {
        PI * self.radius.powi(2)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.center.distance_to(point) <= self.radius
    }

    pub fn to_data(&self) -> Result<String> {
        let (x, y) = (self.center.x, self.center.y);
        finite_json(
            &json!({"x": x, "y": y, "radius": self.radius}),
            &[x, y, self.radius],
            "Circle",
        )
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circle{{center: {}, radius: {}}}", self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scale_includes_radius() {
        let mut c = Circle::new(2.0, 4.0, 7.0);
        c.scale(0.5);
        assert_eq!(c, Circle::new(1.0, 2.0, 3.5));
    }

    #[test]
    fn contains_edge() {
        let c = Circle::new(0.0, 0.0, 5.0);
        assert!(c.contains(Point::new(3.0, 4.0)));
        assert!(!c.contains(Point::new(3.1, 4.0)));
    }

    #[test]
    fn from_data_needs_radius() {
        assert!(Circle::from_data(&json!({"x": 1, "y": 1})).is_err());
        let c = Circle::from_data(&json!({"x": 1, "y": 1, "radius": 2})).unwrap();
        assert!((c.area() - 4.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn to_data_reads_back() {
        let c = Circle::new(1.5, -2.0, 7.0);
        let value: Value = serde_json::from_str(&c.to_data().unwrap()).unwrap();
        assert_eq!(Circle::from_data(&value).unwrap(), c);
        assert!(Circle::new(0.0, 0.0, f64::NAN).to_data().is_err());
    }
}
