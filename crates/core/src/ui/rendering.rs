//! Texture upload helpers.
//!
//! Surfaces are re-rendered off screen; each one is mirrored into an egui
//! texture that is only re-uploaded when the surface's generation changes.

use eframe::egui;
use tiny_skia::Pixmap;

use crate::session::NoticeLevel;

/// Converts a premultiplied pixmap straight into egui's premultiplied image.
pub fn color_image(pixmap: &Pixmap) -> egui::ColorImage {
    let size = [pixmap.width() as usize, pixmap.height() as usize];
    egui::ColorImage::from_rgba_premultiplied(size, pixmap.data())
}

/// A texture mirroring a surface that is redrawn from time to time.
pub struct SurfaceTexture {
    name: &'static str,
    handle: Option<egui::TextureHandle>,
    generation: Option<u64>,
}

impl SurfaceTexture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: None,
            generation: None,
        }
    }

    /// Uploads `pixmap` if `generation` differs from the uploaded one.
    pub fn sync(&mut self, ctx: &egui::Context, generation: u64, pixmap: &Pixmap) {
        if self.generation == Some(generation) && self.handle.is_some() {
            return;
        }
        let image = color_image(pixmap);
        match &mut self.handle {
            Some(handle) => handle.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.handle = Some(ctx.load_texture(self.name, image, egui::TextureOptions::NEAREST));
            }
        }
        self.generation = Some(generation);
    }

    pub fn clear(&mut self) {
        self.handle = None;
        self.generation = None;
    }

    pub fn handle(&self) -> Option<&egui::TextureHandle> {
        self.handle.as_ref()
    }
}

pub fn notice_color(level: NoticeLevel) -> egui::Color32 {
    match level {
        NoticeLevel::Info => egui::Color32::LIGHT_GRAY,
        NoticeLevel::Warning => egui::Color32::YELLOW,
        NoticeLevel::Error => egui::Color32::RED,
    }
}
