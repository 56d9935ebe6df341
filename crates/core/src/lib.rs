//! Cats-Eye Core Library
//!
//! This library provides the core functionality for the cats-eye pattern
//! maker: pick a triangle out of an image and repeat its eightfold
//! reflection as a seamless kaleidoscope tile.
//!
//! # Overview
//!
//! The library handles:
//!
//! - **Geometry**: Points, triangles and hit testing via [`geometry`]
//! - **Drawing**: Retained-mode surfaces and components via [`canvas`]
//! - **Selection**: The draggable triangle selector via [`selection`]
//! - **Rendering**: Triangle to square tile via [`render`]
//! - **Output**: Live preview and image export via [`pattern`]
//! - **Persistence**: The last image and settings via [`storage`]
//! - **User Interface**: The interactive editor via [`ui`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`CatsEye`] facade:
//!
//! ```ignore
//! use cats_eye_core::CatsEye;
//!
//! // Initialize with environment configuration
//! let app = CatsEye::new()?;
//!
//! // Open the editor, restoring the last image if there is one
//! app.run_interactive(None)?;
//! ```
//!
//! Without a window, drive a [`Session`] directly:
//!
//! ```ignore
//! let mut session = app.session()?;
//! session.load_image_file(Path::new("photo.jpg"))?;
//! let path = session.save_image()?;
//! ```
//!
//! # Module Structure
//!
//! - [`canvas`]: Drawing surfaces and component containers
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Geometric primitives
//! - [`image_processing`]: Decoding, encoding and pixel conversion
//! - [`pattern`]: Preview and export of the repeating pattern
//! - [`render`]: Tile rendering
//! - [`schedule`]: Clocks and debouncing
//! - [`selection`]: The triangle selector
//! - [`session`]: Application state tying everything together
//! - [`storage`]: Key-value persistence
//! - [`ui`]: User interface components

pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image_processing;
pub mod pattern;
pub mod render;
pub mod schedule;
pub mod selection;
pub mod session;
pub mod storage;
pub mod ui;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result, StorageError};
pub use geometry::{Corner, Point, Size, Triangle};
pub use image_processing::{ExportFormat, SourceImage};
pub use session::{Notice, NoticeLevel, Session};

use std::path::Path;

use log::info;

/// Main entry point for the cats-eye application.
///
/// This struct provides a facade over the various subsystems,
/// handling initialization and orchestration.
///
/// # Example
///
/// ```ignore
/// use cats_eye_core::CatsEye;
///
/// let app = CatsEye::new()?;
/// app.run_interactive(Some(Path::new("photo.jpg")))?;
/// ```
pub struct CatsEye {
    config: Config,
}

impl CatsEye {
    /// Creates a new instance from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Opens a session on the configured store.
    ///
    /// Stored dimensions and the grid flag are restored; the stored image is
    /// not loaded until [`Session::reload_last_image`] is called.
    pub fn session(&self) -> Result<Session> {
        Session::new(&self.config)
    }

    /// Opens the editor window.
    ///
    /// With `image` the editor starts on that file; otherwise it restores
    /// the image from the last run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded or the UI fails to
    /// start. A stored image that no longer decodes is dropped and the editor
    /// opens empty.
    pub fn run_interactive(&self, image: Option<&Path>) -> Result<()> {
        let mut session = self.session()?;
        match image {
            Some(path) => session.load_image_file(path)?,
            None => {
                if let Err(e) = session.reload_last_image() {
                    info!("Starting without the stored image: {e}");
                }
            }
        }
        ui::run_pattern_ui(session)
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    ///
    /// Changes apply to sessions opened afterwards.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present.
pub fn init() {
    let _ = dotenvy::dotenv();
}
