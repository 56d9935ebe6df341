//! Mutable 2D geometry values.
//!
//! Every shape here is a small `Copy` value with in-place mutators
//! (`translate`, `scale`, ...) and derived queries (`area`, `contains`).
//! Shapes that cross a persistence boundary also convert from untrusted
//! JSON with `from_data` and back with `to_data`.

mod circle;
mod point;
mod rectangle;
mod triangle;

pub use circle::Circle;
pub use point::Point;
pub use rectangle::Rectangle;
pub use triangle::{Corner, Triangle};

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Width and height of an image or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both sides are positive and finite.
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether a point lies within `[0, width] x [0, height]`.
    pub fn bounds(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Reads a numeric field from a JSON object, naming `type_name` on failure.
pub(crate) fn number_field(
    data: &Value,
    field: &str,
    type_name: &'static str,
    message: &str,
) -> Result<f64> {
    data.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| AppError::data(type_name, message))
}

/// Serializes `value` as compact JSON.
///
/// JSON has no representation for NaN or infinities, so any non-finite
/// coordinate is rejected instead of being written out as `null`.
pub(crate) fn finite_json<T: Serialize + ?Sized>(
    value: &T,
    coordinates: &[f64],
    type_name: &'static str,
) -> Result<String> {
    if coordinates.iter().any(|c| !c.is_finite()) {
        return Err(AppError::data(type_name, "coordinates must be finite numbers"));
    }
    Ok(serde_json::to_string(value)?)
}
