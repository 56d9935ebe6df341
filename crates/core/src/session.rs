//! The application session: one loaded image and everything derived from it.
//!
//! [`Session`] owns the selector, the renderer, the preview and the saver,
//! and keeps them consistent with the persisted records. Front ends feed it
//! pointer events and control changes, call [`Session::tick`] from their
//! event loop, and show whatever [`Notice`]s it queues.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use tiny_skia::Pixmap;

use crate::canvas::{MouseButton, PointerId, Touch};
use crate::config::Config;
use crate::error::{AppError, Result, StorageError};
use crate::geometry::{Corner, Point, Size, Triangle};
use crate::image_processing::SourceImage;
use crate::pattern::{PatternPreview, PatternSave};
use crate::render::Render;
use crate::schedule::{Clock, SystemClock};
use crate::selection::Selection;
use crate::storage::Persistence;

/// Tile scale, in percent, applied to every newly loaded image.
pub const DEFAULT_TILE_SCALE: i64 = 100;
pub const DEFAULT_SAVE_WIDTH: i64 = 1920;
pub const DEFAULT_SAVE_HEIGHT: i64 = 1080;
/// Smallest accepted value for any dimension setting.
pub const MIN_DIMENSION: i64 = 1;

pub const SAVE_WIDTH: &str = "save-width";
pub const SAVE_HEIGHT: &str = "save-height";
pub const TILE_SCALE: &str = "tile-scale";

const STORE_WARNING: &str = "You can continue as normal, but be aware that your work \
                             will not be saved when the app is closed.";
const RENDER_FAILURE: &str = "Failed to render the image: it might be too big.\n\n\
                              If the image is large, try resizing it to be smaller \
                              before loading it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Converts stored save dimensions to pixel sizes without wrapping.
fn export_size(width: i64, height: i64) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(AppError::exhausted(format!(
            "Cannot save a {width}x{height} image"
        ))),
    }
}

pub struct Session {
    persistence: Persistence,
    selection: Selection,
    preview: PatternPreview,
    renderer: Option<Render>,
    saver: Option<PatternSave>,
    pattern: Option<Arc<Pixmap>>,
    tile_scale: i64,
    save_width: i64,
    save_height: i64,
    show_grid: bool,
    output_dir: PathBuf,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_parts(
            config.open_persistence(),
            Arc::new(SystemClock),
            config.output_dir.clone(),
        )
    }

    /// Builds a session from explicit collaborators, restoring the stored
    /// dimensions and grid flag.
    pub fn with_parts(
        persistence: Persistence,
        clock: Arc<dyn Clock + Send + Sync>,
        output_dir: PathBuf,
    ) -> Result<Self> {
        let stored = |name: &str| {
            persistence
                .fetch_dimension(name)
                .filter(|value| *value >= MIN_DIMENSION)
        };
        let tile_scale = stored(TILE_SCALE).unwrap_or(DEFAULT_TILE_SCALE);
        let save_width = stored(SAVE_WIDTH).unwrap_or(DEFAULT_SAVE_WIDTH);
        let save_height = stored(SAVE_HEIGHT).unwrap_or(DEFAULT_SAVE_HEIGHT);
        let show_grid = persistence.fetch_show_grid();

        Ok(Self {
            selection: Selection::with_clock(clock)?,
            preview: PatternPreview::new(),
            renderer: None,
            saver: None,
            pattern: None,
            tile_scale,
            save_width,
            save_height,
            show_grid,
            output_dir,
            notices: Vec::new(),
            persistence,
        })
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Reports `error` to the user and hands it back.
    fn fail<T>(&mut self, error: AppError) -> Result<T> {
        self.notify(NoticeLevel::Error, error.to_string());
        Err(error)
    }

    /// Loads a new image from disk with a fresh selection and tile scale.
    pub fn load_image_file(&mut self, path: &Path) -> Result<()> {
        match SourceImage::open(path) {
            Ok((image, bytes)) => self.install_new_image(image, &bytes),
            Err(e) => self.fail(e),
        }
    }

    /// As [`load_image_file`](Self::load_image_file), from encoded bytes.
    pub fn load_image_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        match SourceImage::decode(name, bytes) {
            Ok(image) => self.install_new_image(image, bytes),
            Err(e) => self.fail(e),
        }
    }

    fn install_new_image(&mut self, image: SourceImage, bytes: &[u8]) -> Result<()> {
        info!(
            "Loaded {} ({}x{}, {})",
            image.name(),
            image.width(),
            image.height(),
            image.mime_type()
        );

        if let Err(e) = self
            .persistence
            .store_last_image(image.name(), image.mime_type(), bytes)
        {
            warn!("Failed to store {}: {}", image.name(), e);
            let reason = match e {
                StorageError::Unavailable => "storage is not available",
                StorageError::QuotaExceeded { .. } => "it's probably too big",
                _ => "the store could not be written",
            };
            self.notify(
                NoticeLevel::Warning,
                format!("Failed to store the image: {reason}.\n\n{STORE_WARNING}"),
            );
        }

        self.tile_scale =
            self.persistence
                .validate_and_store_dimension(TILE_SCALE, DEFAULT_TILE_SCALE as f64, MIN_DIMENSION);
        self.persistence.drop_selection_triangle();

        self.setup_from_image(Arc::new(image), None)
    }

    /// Reloads the most recently stored image with its stored selection.
    ///
    /// Returns `false` if there is nothing to reload.
    pub fn reload_last_image(&mut self) -> Result<bool> {
        let Some(record) = self.persistence.fetch_last_image() else {
            return Ok(false);
        };

        let image = match SourceImage::decode(record.name, &record.bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("Stored image can no longer be decoded: {e}");
                self.persistence.drop_last_image();
                return self.fail(e);
            }
        };
        info!("Reloaded {}", image.name());

        let triangle = self.persistence.reload_selection_triangle(image.size());
        self.setup_from_image(Arc::new(image), triangle)?;
        Ok(true)
    }

    /// Builds the renderer, saver and selector for `image` and renders the
    /// first tile, rolling everything back if any step fails.
    fn setup_from_image(&mut self, image: Arc<SourceImage>, triangle: Option<Triangle>) -> Result<()> {
        self.saver = Some(PatternSave::new(image.name(), image.mime_type()));

        let result = self.try_setup(image, triangle);
        if let Err(e) = &result {
            self.fail_render(e);
        }
        result
    }

    fn try_setup(&mut self, image: Arc<SourceImage>, triangle: Option<Triangle>) -> Result<()> {
        self.renderer = Some(Render::new(
            image.clone(),
            self.scale_factor(),
            self.show_grid,
        )?);

        self.selection.set_image(image)?;
        if let Some(triangle) = triangle {
            for corner in Corner::ALL {
                self.selection.move_corner_to(corner, triangle.corner(corner))?;
            }
        }

        self.update_pattern()
    }

    /// Forgets the current image after a render failure. Save dimensions and
    /// tile scale are kept.
    fn fail_render(&mut self, e: &AppError) {
        error!("Render failed: {e}");

        self.renderer = None;
        self.saver = None;
        self.pattern = None;
        self.preview.clear_pattern();
        self.selection.reset();

        self.persistence.drop_last_image();
        self.persistence.drop_selection_triangle();

        self.notify(NoticeLevel::Error, format!("{RENDER_FAILURE}\n\n({e})"));
    }

    /// Renders a tile from the current selection and hands it to the preview
    /// and the saver.
    fn update_pattern(&mut self) -> Result<()> {
        let (Some(renderer), Some(triangle)) = (self.renderer.as_mut(), self.selection.triangle())
        else {
            return Ok(());
        };

        let pattern = Arc::new(renderer.make_pattern(triangle)?);
        if let Some(saver) = self.saver.as_mut() {
            saver.set_pattern(pattern.clone());
        }
        self.preview.set_pattern(pattern.clone())?;
        self.pattern = Some(pattern);
        Ok(())
    }

    /// Re-renders, resetting the session if rendering fails.
    fn refresh_pattern(&mut self) -> Result<()> {
        let result = self.update_pattern();
        if let Err(e) = &result {
            self.fail_render(e);
        }
        result
    }

    /// Runs the debounced pattern recompute if it is due. Returns whether a
    /// new tile was rendered.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.selection.poll_recompute() {
            return Ok(false);
        }
        self.refresh_pattern()?;
        Ok(true)
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.selection.recompute_deadline()
    }

    pub fn pointer_down(&mut self, page: Point, button: MouseButton) -> bool {
        self.selection.pointer_down(page, button)
    }

    pub fn touch_start(&mut self, touches: &[Touch]) -> usize {
        self.selection.touch_start(touches)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, page: Point) -> Result<()> {
        self.selection.pointer_move(pointer, page)
    }

    /// Ends a drag and persists the resulting triangle.
    pub fn pointer_up(&mut self, pointer: PointerId) {
        if let Some(triangle) = self.selection.pointer_up(pointer) {
            self.persistence.store_selection_triangle(&triangle);
        }
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if let Some(triangle) = self.selection.pointer_cancel(pointer) {
            self.persistence.store_selection_triangle(&triangle);
        }
    }

    /// Moves the selection to `triangle` and re-renders at once.
    ///
    /// # Errors
    ///
    /// Fails if no image is loaded or the triangle does not fit the image.
    pub fn set_selection_triangle(&mut self, triangle: Triangle) -> Result<()> {
        if let Err(e) = self.selection.set_triangle(triangle) {
            return self.fail(e);
        }
        self.persistence.store_selection_triangle(&triangle);
        self.refresh_pattern()
    }

    fn scale_factor(&self) -> f64 {
        self.tile_scale as f64 / 100.0
    }

    /// Sets the tile scale in percent and re-renders.
    pub fn set_tile_scale(&mut self, percent: f64) -> Result<()> {
        self.tile_scale =
            self.persistence
                .validate_and_store_dimension(TILE_SCALE, percent, MIN_DIMENSION);

        let scale = self.scale_factor();
        match self.renderer.as_mut() {
            Some(renderer) => {
                renderer.set_scale_factor(scale);
                self.refresh_pattern()
            }
            None => Ok(()),
        }
    }

    pub fn reset_tile_scale(&mut self) -> Result<()> {
        self.set_tile_scale(DEFAULT_TILE_SCALE as f64)
    }

    pub fn set_show_grid(&mut self, show_grid: bool) -> Result<()> {
        self.show_grid = show_grid;
        self.persistence.store_show_grid(show_grid);

        match self.renderer.as_mut() {
            Some(renderer) => {
                renderer.set_show_grid(show_grid);
                self.refresh_pattern()
            }
            None => Ok(()),
        }
    }

    pub fn toggle_grid(&mut self) -> Result<()> {
        self.set_show_grid(!self.show_grid)
    }

    pub fn set_save_width(&mut self, width: f64) -> i64 {
        self.save_width = self
            .persistence
            .validate_and_store_dimension(SAVE_WIDTH, width, MIN_DIMENSION);
        self.save_width
    }

    pub fn set_save_height(&mut self, height: f64) -> i64 {
        self.save_height = self
            .persistence
            .validate_and_store_dimension(SAVE_HEIGHT, height, MIN_DIMENSION);
        self.save_height
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn saved(&mut self, result: Result<PathBuf>) -> Result<PathBuf> {
        match result {
            Ok(path) => {
                self.notify(NoticeLevel::Info, format!("Saved {}", path.display()));
                Ok(path)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Writes one tile at its own size into the output directory.
    pub fn save_tile(&mut self) -> Result<PathBuf> {
        let result = match &self.saver {
            Some(saver) => saver.save_tile(&self.output_dir),
            None => Err(AppError::NoImage),
        };
        self.saved(result)
    }

    /// Writes the pattern at the save width and height.
    pub fn save_image(&mut self) -> Result<PathBuf> {
        let result = match &self.saver {
            Some(saver) => export_size(self.save_width, self.save_height)
                .and_then(|(width, height)| saver.save_image(&self.output_dir, width, height)),
            None => Err(AppError::NoImage),
        };
        self.saved(result)
    }

    /// Tells the selector how much room the window has.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<()> {
        self.selection.set_viewport(viewport)
    }

    /// Where the selector's surface sits in page coordinates.
    pub fn set_selection_offset(&mut self, offset: Point) {
        self.selection.set_offset(offset);
    }

    pub fn set_preview_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.preview.resize_to_container(width, height)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn preview(&self) -> &PatternPreview {
        &self.preview
    }

    /// The most recent tile.
    pub fn pattern(&self) -> Option<&Arc<Pixmap>> {
        self.pattern.as_ref()
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Whether an image is loaded and rendering; saving is only possible
    /// then.
    pub fn can_save(&self) -> bool {
        self.renderer.is_some() && self.saver.is_some()
    }

    pub fn image_name(&self) -> Option<&str> {
        self.saver.as_ref().map(PatternSave::name)
    }

    pub fn tile_scale(&self) -> i64 {
        self.tile_scale
    }

    pub fn save_width(&self) -> i64 {
        self.save_width
    }

    pub fn save_height(&self) -> i64 {
        self.save_height
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }
}
