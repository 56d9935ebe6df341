//! Image decoding, pixel conversion and export encoding.
//!
//! Source images arrive as encoded files and are decoded with the `image`
//! crate, then converted to premultiplied [`tiny_skia::Pixmap`]s for
//! drawing. Rendered surfaces travel the opposite way on export.
//!
//! # Pixel formats
//!
//! `image` works with straight (unpremultiplied) RGBA while `tiny-skia`
//! stores premultiplied colour. Every crossing between the two goes through
//! [`pixmap_from_rgba`] or [`rgba_from_pixmap`].

use crate::canvas::MAX_SURFACE_DIMENSION;
use crate::error::{AppError, Result};
use crate::geometry::Size;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tiny_skia::{ColorU8, Pixmap};

/// A decoded source image, ready to be drawn.
pub struct SourceImage {
    name: String,
    mime_type: String,
    pixmap: Pixmap,
}

impl SourceImage {
    /// Reads and decodes an image file.
    ///
    /// Returns the decoded image together with the raw file bytes, which the
    /// caller may persist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read and
    /// [`AppError::ImageDecode`] if it is not a supported image.
    pub fn open(path: &Path) -> Result<(Self, Vec<u8>)> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let image = Self::decode(name, &bytes)?;
        Ok((image, bytes))
    }

    /// Decodes an image from its encoded bytes.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| AppError::decode(format!("Unrecognised image format: {}", e)))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| AppError::decode(format!("Failed to decode image: {}", e)))?;

        Self::from_rgba(name, format.to_mime_type(), &decoded.to_rgba8())
    }

    /// Wraps already-decoded straight-alpha pixels.
    pub fn from_rgba(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        rgba: &RgbaImage,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            mime_type: mime_type.into(),
            pixmap: pixmap_from_rgba(rgba)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Formats a rendered pattern can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Picks the export format matching a source MIME type, falling back to PNG.
    pub fn from_mime_type(mime_type: &str) -> Self {
        match ImageFormat::from_mime_type(mime_type) {
            Some(ImageFormat::Jpeg) => Self::Jpeg,
            _ => Self::Png,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn mime_type(self) -> &'static str {
        self.image_format().to_mime_type()
    }
}

/// Image conversion and encoding helpers.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Encodes a rendered pixmap.
    ///
    /// JPEG has no alpha channel, so transparent areas are flattened.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageEncode`] if encoding fails.
    pub fn encode(pixmap: &Pixmap, format: ExportFormat) -> Result<Vec<u8>> {
        let rgba = rgba_from_pixmap(pixmap)?;
        let image = match format {
            ExportFormat::Png => DynamicImage::ImageRgba8(rgba),
            ExportFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        };

        let mut buffer: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        image
            .write_to(&mut cursor, format.image_format())
            .map_err(|e| AppError::encode(format!("Failed to encode image: {}", e)))?;

        Ok(buffer)
    }
}

/// Converts straight-alpha RGBA pixels into a premultiplied pixmap.
///
/// # Errors
///
/// Returns [`AppError::ResourceExhausted`] if the image is larger than the
/// largest drawable surface.
pub fn pixmap_from_rgba(rgba: &RgbaImage) -> Result<Pixmap> {
    let (width, height) = rgba.dimensions();
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(AppError::exhausted(format!(
            "{width}x{height} image is too large to draw"
        )));
    }
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| AppError::exhausted(format!("cannot allocate a {width}x{height} image")))?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Converts a premultiplied pixmap back to straight-alpha RGBA pixels.
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage> {
    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| AppError::encode("Failed to create image buffer"))
}
