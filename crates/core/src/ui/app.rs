//! Main cats-eye application.
//!
//! This module contains the `CatsEyeApp` struct which implements the
//! `eframe::App` trait: controls along the top, the selector on the left,
//! and the live preview filling the rest of the window.

use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;
use log::{debug, warn};

use super::rendering::{notice_color, SurfaceTexture};
use super::selection::{process_drag_event, SelectionEvent};
use super::state::{Controls, StatusLine};
use crate::error::{AppError, Result};
use crate::geometry::Size;
use crate::session::{Session, MIN_DIMENSION};

/// The interactive pattern editor.
pub struct CatsEyeApp {
    session: Session,
    controls: Controls,
    status: StatusLine,
    selection_texture: SurfaceTexture,
    preview_texture: SurfaceTexture,
}

impl CatsEyeApp {
    pub fn new(session: Session) -> Self {
        let controls = Controls::from_session(&session);
        Self {
            session,
            controls,
            status: StatusLine::default(),
            selection_texture: SurfaceTexture::new("selection"),
            preview_texture: SurfaceTexture::new("preview"),
        }
    }

    /// Finishes a control action. Errors are already queued as notices by
    /// the session; the controls are re-read since it may have clamped or
    /// reset them.
    fn settle<T>(&mut self, result: Result<T>) {
        if let Err(e) = result {
            debug!("Session reported: {e}");
        }
        self.controls = Controls::from_session(&self.session);
    }

    fn pick_image() -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("🗁 Load Image").clicked() {
                if let Some(path) = Self::pick_image() {
                    let result = self.session.load_image_file(&path);
                    self.settle(result);
                }
            }

            ui.separator();

            let can_save = self.session.can_save();

            ui.label("Tile scale:");
            let scale = ui.add_enabled(
                can_save,
                egui::DragValue::new(&mut self.controls.tile_scale)
                    .range(MIN_DIMENSION as f64..=1000.0)
                    .speed(1.0)
                    .suffix("%"),
            );
            if scale.drag_stopped() || (scale.lost_focus() && !scale.dragged()) {
                let result = self.session.set_tile_scale(self.controls.tile_scale);
                self.settle(result);
            }
            if ui.add_enabled(can_save, egui::Button::new("Reset")).clicked() {
                let result = self.session.reset_tile_scale();
                self.settle(result);
            }

            let grid_label = if self.session.show_grid() {
                "Hide Grid"
            } else {
                "Show Grid"
            };
            if ui.button(grid_label).clicked() {
                let result = self.session.toggle_grid();
                self.settle(result);
            }

            ui.separator();

            if ui.add_enabled(can_save, egui::Button::new("Save Tile")).clicked() {
                let result = self.session.save_tile();
                self.settle(result);
            }

            let width = ui.add(
                egui::DragValue::new(&mut self.controls.save_width)
                    .range(MIN_DIMENSION as f64..=f64::from(crate::canvas::MAX_SURFACE_DIMENSION))
                    .suffix(" px"),
            );
            if width.changed() {
                self.session.set_save_width(self.controls.save_width);
            }
            ui.label("×");
            let height = ui.add(
                egui::DragValue::new(&mut self.controls.save_height)
                    .range(MIN_DIMENSION as f64..=f64::from(crate::canvas::MAX_SURFACE_DIMENSION))
                    .suffix(" px"),
            );
            if height.changed() {
                self.session.set_save_height(self.controls.save_height);
            }

            if ui.add_enabled(can_save, egui::Button::new("Save Image")).clicked() {
                let result = self.session.save_image();
                self.settle(result);
            }
        });
    }

    fn render_status(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.status.current().cloned() else {
            ui.label(egui::RichText::new("Load an image to start.").weak());
            return;
        };
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&notice.message).color(notice_color(notice.level)));
            if ui.small_button("✕").clicked() {
                self.status.dismiss();
            }
        });
    }

    fn render_selection(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let pixels_per_point = ctx.pixels_per_point();
        let selection = self.session.selection();
        if !selection.is_visible() {
            self.selection_texture.clear();
            return;
        }

        let surface = selection.surface();
        self.selection_texture
            .sync(ctx, selection.generation(), surface.pixmap());

        let Some(texture) = self.selection_texture.handle() else {
            return;
        };
        let size = egui::vec2(surface.width() as f32, surface.height() as f32) / pixels_per_point;
        let response = ui.add(egui::Image::new((texture.id(), size)).sense(egui::Sense::drag()));

        if process_drag_event(&response, &mut self.session, pixels_per_point) == SelectionEvent::Released
        {
            self.controls = Controls::from_session(&self.session);
        }
    }

    fn render_preview(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let pixels_per_point = ctx.pixels_per_point();
        let available = ui.available_size() * pixels_per_point;
        let result = self
            .session
            .set_preview_size(available.x.max(0.0) as u32, available.y.max(0.0) as u32);
        if let Err(e) = result {
            warn!("Failed to resize preview: {e}");
        }

        let preview = self.session.preview();
        let Some(surface) = preview.surface() else {
            self.preview_texture.clear();
            return;
        };
        self.preview_texture
            .sync(ctx, preview.generation(), surface.pixmap());
        if let Some(texture) = self.preview_texture.handle() {
            let size = egui::vec2(surface.width() as f32, surface.height() as f32) / pixels_per_point;
            ui.add(egui::Image::new((texture.id(), size)));
        }
    }
}

impl eframe::App for CatsEyeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Run the debounced recompute first so this frame shows the result.
        if let Err(e) = self.session.tick() {
            debug!("Recompute failed: {e}");
        }

        let viewport = ctx.viewport_rect().size() * ctx.pixels_per_point();
        let viewport = Size::new(f64::from(viewport.x), f64::from(viewport.y));
        if let Err(e) = self.session.set_viewport(viewport) {
            warn!("Failed to resize selection: {e}");
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.render_controls(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.render_status(ui);
        });

        egui::SidePanel::left("selection")
            .resizable(false)
            .show_animated(ctx, self.session.selection().is_visible(), |ui| {
                self.render_selection(ui, ctx);
            });

        let panel_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(0))
            .outer_margin(egui::Margin::same(0));
        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                self.render_preview(ui, ctx);
            });

        self.status.push(self.session.take_notices());

        // Handle escape to close
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}

/// Opens the editor window and returns when the user closes it.
pub fn run(session: Session) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cats Eye")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cats Eye",
        options,
        Box::new(move |_cc| Ok(Box::new(CatsEyeApp::new(session)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
