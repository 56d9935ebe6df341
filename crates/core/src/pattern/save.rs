use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use tiny_skia::Pixmap;

use super::PatternDraw;
use crate::canvas::Surface;
use crate::error::{AppError, Result};
use crate::image_processing::{ExportFormat, ImageProcessor};

/// Renders the tile at arbitrary sizes and writes it to disk.
pub struct PatternSave {
    name: String,
    format: ExportFormat,
    pattern: Option<Arc<Pixmap>>,
}

impl PatternSave {
    /// `name` and `mime_type` describe the source image; exports reuse its
    /// name and, where possible, its format.
    pub fn new(name: impl Into<String>, mime_type: &str) -> Self {
        Self {
            name: name.into(),
            format: ExportFormat::from_mime_type(mime_type),
            pattern: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn set_pattern(&mut self, pattern: Arc<Pixmap>) {
        self.pattern = Some(pattern);
    }

    /// Repeats the tile over a `width` x `height` pixmap.
    pub fn render(&self, width: u32, height: u32) -> Result<Pixmap> {
        let mut surface = Surface::new(width, height)?;
        self.draw_pattern_on(&mut surface);
        Ok(surface.into_pixmap())
    }

    pub fn encode(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        ImageProcessor::encode(&self.render(width, height)?, self.format)
    }

    pub fn file_name(&self, width: u32, height: u32) -> String {
        format!("catseye-{}x{}-{}", width, height, self.name)
    }

    /// Renders and writes a `width` x `height` image into `dir`, returning
    /// the written path.
    pub fn save_image(&self, dir: &Path, width: u32, height: u32) -> Result<PathBuf> {
        if self.pattern.is_none() {
            return Err(AppError::NoImage);
        }
        let bytes = self.encode(width, height)?;

        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(width, height));
        fs::write(&path, bytes)?;

        info!("Saved {}", path.display());
        Ok(path)
    }

    /// Saves a single tile at its own size.
    pub fn save_tile(&self, dir: &Path) -> Result<PathBuf> {
        let pattern = self.pattern.as_ref().ok_or(AppError::NoImage)?;
        self.save_image(dir, pattern.width(), pattern.height())
    }
}

impl PatternDraw for PatternSave {
    fn pattern(&self) -> Option<&Pixmap> {
        self.pattern.as_deref()
    }
}
