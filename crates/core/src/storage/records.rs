use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::error::StorageError;
use crate::geometry::{Size, Triangle};

const IMAGE_KEY: &str = "image";
const TRIANGLE_KEY: &str = "selectionTriangle";
const GRID_KEY: &str = "showGrid";

/// The last loaded image as it is kept in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ImageEntry {
    name: String,
    #[serde(rename = "type")]
    mime_type: String,
    /// Base64 of the file bytes as loaded.
    data: String,
}

/// A previously loaded image recovered from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Typed, best-effort access to the app's persisted records.
///
/// Without a store every fetch finds nothing and every write except
/// [`store_last_image`](Self::store_last_image) quietly does nothing.
pub struct Persistence {
    store: Option<Box<dyn KeyValueStore>>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Some(Box::new(store)),
        }
    }

    /// Persistence with no backing store.
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn get(&self, key: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(key) {
            Ok(value) => value.filter(|value| !value.is_empty()),
            Err(e) => {
                warn!("Failed to read {key}: {e}");
                None
            }
        }
    }

    fn delete(&mut self, key: &str) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.delete(key) {
                debug!("Failed to delete {key}: {e}");
            }
        }
    }

    /// Settings are only kept alongside a stored image, and failures are
    /// dropped: the user has already been warned when the image failed.
    fn set_setting(&mut self, key: &str, value: &str) {
        if !self.has_image() {
            return;
        }
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.set(key, value) {
                debug!("Failed to store {key}: {e}");
            }
        }
    }

    /// Stores an image as the most recently loaded one.
    ///
    /// The previous image is removed first, so a failed write leaves no
    /// stale image behind.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] without a store, or the
    /// store's error, typically [`StorageError::QuotaExceeded`].
    pub fn store_last_image(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let store = self.store.as_mut().ok_or(StorageError::Unavailable)?;
        store.delete(IMAGE_KEY)?;

        let entry = ImageEntry {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        };
        let json = serde_json::to_string(&entry).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        store.set(IMAGE_KEY, &json)
    }

    /// The most recently stored image. A record that cannot be read is
    /// deleted.
    pub fn fetch_last_image(&mut self) -> Option<ImageRecord> {
        let json = self.get(IMAGE_KEY)?;

        let parsed = serde_json::from_str::<ImageEntry>(&json)
            .map_err(|e| e.to_string())
            .and_then(|entry| {
                let bytes = STANDARD.decode(&entry.data).map_err(|e| e.to_string())?;
                Ok(ImageRecord {
                    name: entry.name,
                    mime_type: entry.mime_type,
                    bytes,
                })
            });

        match parsed {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding unreadable stored image: {e}");
                self.delete(IMAGE_KEY);
                None
            }
        }
    }

    pub fn drop_last_image(&mut self) {
        self.delete(IMAGE_KEY);
    }

    pub fn has_image(&self) -> bool {
        self.get(IMAGE_KEY).is_some()
    }

    pub fn store_dimension(&mut self, name: &str, value: i64) {
        self.set_setting(name, &value.to_string());
    }

    /// A stored dimension, truncated to an integer.
    pub fn fetch_dimension(&self, name: &str) -> Option<i64> {
        let value = self.get(name)?.trim().parse::<f64>().ok()?;
        value.is_finite().then(|| value.trunc() as i64)
    }

    /// Raises `value` to at least `min`, truncates it to an integer, stores
    /// it, and returns the value actually used.
    pub fn validate_and_store_dimension(&mut self, name: &str, value: f64, min: i64) -> i64 {
        let value = if value.is_nan() || value < min as f64 {
            min
        } else {
            value.trunc() as i64
        };
        self.store_dimension(name, value);
        value
    }

    pub fn drop_dimension(&mut self, name: &str) {
        self.delete(name);
    }

    /// Stores `triangle`, keeping the previous record if it cannot be
    /// written as JSON.
    pub fn store_selection_triangle(&mut self, triangle: &Triangle) {
        match triangle.to_data() {
            Ok(json) => self.set_setting(TRIANGLE_KEY, &json),
            Err(e) => warn!("Not storing selection triangle {triangle}: {e}"),
        }
    }

    /// The stored triangle. A record that fails validation is deleted.
    pub fn fetch_selection_triangle(&mut self) -> Option<Triangle> {
        let json = self.get(TRIANGLE_KEY)?;

        let parsed = serde_json::from_str(&json)
            .map_err(crate::AppError::from)
            .and_then(|data| Triangle::from_data(&data));

        match parsed {
            Ok(triangle) => Some(triangle),
            Err(e) => {
                warn!("Discarding unreadable selection triangle: {e}");
                self.delete(TRIANGLE_KEY);
                None
            }
        }
    }

    pub fn drop_selection_triangle(&mut self) {
        self.delete(TRIANGLE_KEY);
    }

    /// The stored triangle, if it fits an image of size `bounds`.
    ///
    /// A triangle with any point outside the image was not made for it, so
    /// it is deleted.
    pub fn reload_selection_triangle(&mut self, bounds: Size) -> Option<Triangle> {
        let triangle = self.fetch_selection_triangle()?;

        if triangle.iter().all(|point| bounds.bounds(point)) {
            Some(triangle)
        } else {
            debug!(
                "Stored triangle {triangle} does not fit {}x{}",
                bounds.width, bounds.height
            );
            self.drop_selection_triangle();
            None
        }
    }

    /// Only a shown grid is recorded; hiding it removes the entry.
    pub fn store_show_grid(&mut self, show_grid: bool) {
        if show_grid {
            self.set_setting(GRID_KEY, "true");
        } else if self.has_image() {
            self.delete(GRID_KEY);
        }
    }

    pub fn fetch_show_grid(&self) -> bool {
        self.get(GRID_KEY).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::storage::MemoryStore;

    fn with_image() -> Persistence {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence
            .store_last_image("cat.png", "image/png", &[1, 2, 3])
            .unwrap();
        persistence
    }

    #[test]
    fn image_round_trip() {
        let mut persistence = with_image();
        let record = persistence.fetch_last_image().unwrap();
        assert_eq!(record.name, "cat.png");
        assert_eq!(record.mime_type, "image/png");
        assert_eq!(record.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn failed_image_store_removes_previous() {
        let mut persistence = Persistence::new(MemoryStore::with_quota(200));
        persistence
            .store_last_image("small.png", "image/png", &[0; 8])
            .unwrap();

        let err = persistence
            .store_last_image("big.png", "image/png", &[0; 400])
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(persistence.fetch_last_image().is_none());
    }

    #[test]
    fn unavailable_store() {
        let mut persistence = Persistence::unavailable();
        assert!(matches!(
            persistence.store_last_image("a.png", "image/png", &[]),
            Err(StorageError::Unavailable)
        ));
        persistence.store_dimension("save-width", 10);
        assert_eq!(persistence.fetch_dimension("save-width"), None);
        assert!(!persistence.fetch_show_grid());
    }

    #[test]
    fn non_finite_triangle_is_not_stored() {
        let mut persistence = with_image();
        let kept = Triangle::spanning(30.0, 20.0);
        persistence.store_selection_triangle(&kept);

        let mut broken = kept;
        broken.p2.y = f64::NAN;
        persistence.store_selection_triangle(&broken);
        assert_eq!(persistence.fetch_selection_triangle(), Some(kept));
    }

    #[test]
    fn settings_need_an_image() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.store_dimension("tile-scale", 50);
        persistence.store_show_grid(true);
        assert_eq!(persistence.fetch_dimension("tile-scale"), None);
        assert!(!persistence.fetch_show_grid());
    }

    #[test]
    fn dimensions_are_validated() {
        let mut persistence = with_image();
        assert_eq!(persistence.validate_and_store_dimension("save-width", 0.0, 1), 1);
        assert_eq!(persistence.validate_and_store_dimension("save-width", 640.9, 1), 640);
        assert_eq!(persistence.fetch_dimension("save-width"), Some(640));

        persistence.drop_dimension("save-width");
        assert_eq!(persistence.fetch_dimension("save-width"), None);
    }

    #[test]
    fn grid_flag() {
        let mut persistence = with_image();
        persistence.store_show_grid(true);
        assert!(persistence.fetch_show_grid());
        persistence.store_show_grid(false);
        assert!(!persistence.fetch_show_grid());
    }

    #[test]
    fn triangle_out_of_bounds_is_dropped() {
        let mut persistence = with_image();
        let triangle = Triangle::new(
            Point::new(-5.0, 0.0),
            Point::new(300.0, 0.0),
            Point::new(300.0, 300.0),
        );
        persistence.store_selection_triangle(&triangle);
        assert_eq!(persistence.fetch_selection_triangle(), Some(triangle));

        assert_eq!(persistence.reload_selection_triangle(Size::new(300.0, 300.0)), None);
        assert_eq!(persistence.fetch_selection_triangle(), None);
    }

    #[test]
    fn triangle_within_bounds_is_kept() {
        let mut persistence = with_image();
        let triangle = Triangle::spanning(120.0, 80.0);
        persistence.store_selection_triangle(&triangle);
        assert_eq!(
            persistence.reload_selection_triangle(Size::new(300.0, 300.0)),
            Some(triangle)
        );
    }
}
