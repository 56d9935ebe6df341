//! The interactive triangle selector.
//!
//! A [`Selection`] shows the source image at a display scale with the
//! sampling triangle drawn over it and a handle at each corner. Pointer
//! gestures drag either one handle or the whole triangle; the state machine
//! per pointer is `idle -> dragging -> idle`, with the gesture table keyed by
//! [`PointerId`] so independent touches can drive different handles.
//!
//! Every redraw restarts a short debounce; the owner polls
//! [`Selection::poll_recompute`] and re-renders the pattern once the
//! selection has been still for [`RECOMPUTE_DELAY`].

mod point;
mod triangle;

pub use point::{SelectionPoint, POINT_RADIUS};
pub use triangle::SelectionTriangle;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use tiny_skia::Color;

use crate::canvas::{
    triangle_path, CanvasComponent, CanvasContainer, HitSpace, MouseButton, PointerId, Surface,
    Touch,
};
use crate::error::{AppError, Result};
use crate::geometry::{Corner, Point, Rectangle, Size, Triangle};
use crate::image_processing::SourceImage;
use crate::schedule::{Clock, Debouncer, SystemClock};

/// How long the selection must be still before the pattern is recomputed.
pub const RECOMPUTE_DELAY: Duration = Duration::from_millis(20);

const EDGE_WIDTH: f64 = 2.0;

/// The drawable layers of the selector, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionComponent {
    Image,
    Edges,
    Handle(Corner),
}

/// What a gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Corner(Corner),
    Triangle,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    target: DragTarget,
    last_page: Point,
}

/// Everything the selector components draw from.
pub struct SelectionScene {
    image: Arc<SourceImage>,
    triangle: SelectionTriangle,
    document_scale: f64,
}

impl SelectionScene {
    pub fn image(&self) -> &Arc<SourceImage> {
        &self.image
    }

    pub fn triangle(&self) -> &SelectionTriangle {
        &self.triangle
    }

    pub fn document_scale(&self) -> f64 {
        self.document_scale
    }
}

impl CanvasComponent<SelectionScene> for SelectionComponent {
    fn draw(&self, scene: &SelectionScene, surface: &mut Surface) -> Result<()> {
        let scale = scene.document_scale;
        match *self {
            SelectionComponent::Image => {
                let image = &scene.image;
                surface.draw_image(
                    image.pixmap().as_ref(),
                    0.0,
                    0.0,
                    f64::from(image.width()) * scale,
                    f64::from(image.height()) * scale,
                );
            }
            SelectionComponent::Edges => {
                if let Some(path) = triangle_path(&scene.triangle.triangle().scaled(scale)) {
                    surface.stroke_path(&path, EDGE_WIDTH, Color::BLACK);
                }
            }
            SelectionComponent::Handle(corner) => {
                let center = scene.triangle.point(corner).position().scaled(scale);
                surface.fill_circle(center, POINT_RADIUS, Color::from_rgba8(255, 0, 0, 255));
            }
        }
        Ok(())
    }

    fn contains(&self, scene: &SelectionScene, point: Point) -> bool {
        match *self {
            SelectionComponent::Image => {
                let size = scene.image.size();
                Rectangle::new(0.0, 0.0, size.width, size.height).contains(point)
            }
            SelectionComponent::Edges => scene.triangle.contains(point),
            SelectionComponent::Handle(corner) => scene
                .triangle
                .point(corner)
                .contains(point, scene.document_scale),
        }
    }
}

/// The display-only shrink factor that keeps the selector within a quarter
/// of the viewport on each axis.
///
/// The width is fitted first; the height check uses the already-shrunk
/// height, so the second step can only shrink further. A viewport without
/// a usable area leaves the image at full size.
pub fn document_scale(image: Size, viewport: Size) -> f64 {
    let mut scale = 1.0;
    if !viewport.has_area() || !image.has_area() {
        return scale;
    }

    if image.width > viewport.width / 4.0 {
        scale = viewport.width / 4.0 / image.width;
    }

    if image.height * scale > viewport.height / 4.0 {
        scale = viewport.height / 4.0 / image.height;
    }

    scale
}

/// The selector: an image, its triangle, and the gestures acting on them.
pub struct Selection {
    canvas: CanvasContainer<SelectionComponent>,
    scene: Option<SelectionScene>,
    viewport: Option<Size>,
    gestures: HashMap<PointerId, Gesture>,
    recompute: Debouncer,
    clock: Arc<dyn Clock + Send + Sync>,
    generation: u64,
}

impl Selection {
    pub fn new() -> Result<Self> {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Result<Self> {
        Ok(Self {
            canvas: CanvasContainer::new(Surface::new(1, 1)?),
            scene: None,
            viewport: None,
            gestures: HashMap::new(),
            recompute: Debouncer::new(RECOMPUTE_DELAY),
            clock,
            generation: 0,
        })
    }

    /// Installs a new image with a fresh full-image triangle.
    ///
    /// Any gesture in progress is abandoned.
    pub fn set_image(&mut self, image: Arc<SourceImage>) -> Result<()> {
        self.reset();

        let bounds = image.size();
        debug!("selection image set to {}x{}", bounds.width, bounds.height);

        self.scene = Some(SelectionScene {
            image,
            triangle: SelectionTriangle::spanning(bounds),
            document_scale: 1.0,
        });

        self.canvas.add_component(SelectionComponent::Image);
        self.canvas.add_component(SelectionComponent::Edges);
        for corner in Corner::ALL {
            self.canvas.add_component(SelectionComponent::Handle(corner));
        }

        self.layout()?;
        self.draw()
    }

    /// Removes the image, the triangle and all components.
    pub fn reset(&mut self) {
        self.canvas.clear_components();
        self.scene = None;
        self.gestures.clear();
        self.recompute.cancel();
    }

    /// Whether an image is installed; the selector is hidden otherwise.
    pub fn is_visible(&self) -> bool {
        self.scene.is_some()
    }

    pub fn image(&self) -> Option<&Arc<SourceImage>> {
        self.scene.as_ref().map(|scene| &scene.image)
    }

    /// The displayed triangle in true image pixels.
    pub fn triangle(&self) -> Option<Triangle> {
        self.scene.as_ref().map(|scene| scene.triangle.triangle())
    }

    pub fn selection_triangle(&self) -> Option<&SelectionTriangle> {
        self.scene.as_ref().map(|scene| &scene.triangle)
    }

    pub fn document_scale(&self) -> f64 {
        self.scene.as_ref().map_or(1.0, |scene| scene.document_scale)
    }

    pub fn surface(&self) -> &Surface {
        self.canvas.surface()
    }

    /// Bumped on every redraw, so front ends can tell when to re-upload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Refits the selector to `viewport`. Sizes without a usable area, such
    /// as a minimised window, keep the current fit.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<()> {
        if self.viewport == Some(viewport) {
            return Ok(());
        }
        if !viewport.has_area() {
            debug!("ignoring viewport {}x{}", viewport.width, viewport.height);
            return Ok(());
        }
        self.viewport = Some(viewport);

        if self.scene.is_some() {
            self.layout()?;
            self.draw()?;
        }
        Ok(())
    }

    /// Sets where the selector's surface sits on the page.
    pub fn set_offset(&mut self, offset: Point) {
        self.canvas.set_offset(offset);
    }

    /// Sizes the surface to the scaled image plus handle padding on every
    /// side.
    fn layout(&mut self) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        let size = scene.image.size();
        let scale = self
            .viewport
            .map_or(1.0, |viewport| document_scale(size, viewport));
        scene.document_scale = scale;

        let padding = POINT_RADIUS * 2.0;
        let width = (size.width * scale).ceil() + padding;
        let height = (size.height * scale).ceil() + padding;
        self.canvas.resize(width as u32, height as u32)?;
        self.canvas.set_hit_space(HitSpace {
            padding: POINT_RADIUS,
            scale,
        });
        Ok(())
    }

    /// Redraws the selector and restarts the recompute debounce.
    pub fn draw(&mut self) -> Result<()> {
        let Some(scene) = self.scene.as_ref() else {
            return Ok(());
        };

        let surface = self.canvas.surface_mut();
        surface.save();
        surface.translate(POINT_RADIUS, POINT_RADIUS);
        let drawn = self.canvas.draw(scene);
        self.canvas.surface_mut().restore();
        drawn?;

        self.generation += 1;
        self.recompute.schedule(self.clock.now());
        Ok(())
    }

    /// Returns `true` once the selection has been still long enough for the
    /// pattern to be recomputed.
    pub fn poll_recompute(&mut self) -> bool {
        self.recompute.poll(self.clock.now())
    }

    pub fn recompute_deadline(&self) -> Option<Instant> {
        self.recompute.deadline()
    }

    /// Moves one corner outright, as when restoring a stored triangle.
    pub fn move_corner_to(&mut self, corner: Corner, point: Point) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(AppError::NoImage)?;
        scene.triangle.move_corner_to(corner, point);
        self.draw()
    }

    /// Replaces the whole triangle.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DataValidation`] if any point lies outside the
    /// image, and [`AppError::NoImage`] without an image.
    pub fn set_triangle(&mut self, triangle: Triangle) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(AppError::NoImage)?;
        let bounds = scene.triangle.bounds();
        if !triangle.iter().all(|point| bounds.bounds(point)) {
            return Err(AppError::data("Triangle", "points must lie within the image"));
        }

        for corner in Corner::ALL {
            scene.triangle.move_corner_to(corner, triangle.corner(corner));
        }
        self.draw()
    }

    fn is_dragging(&self, target: DragTarget) -> bool {
        self.gestures.values().any(|gesture| gesture.target == target)
    }

    fn begin(&mut self, component: SelectionComponent, pointer: PointerId, page: Point) -> bool {
        let target = match component {
            SelectionComponent::Image => return false,
            SelectionComponent::Edges => DragTarget::Triangle,
            SelectionComponent::Handle(corner) => DragTarget::Corner(corner),
        };

        if self.gestures.contains_key(&pointer) || self.is_dragging(target) {
            debug!("ignoring {pointer:?}: target {target:?} is already being dragged");
            return false;
        }

        debug!("{pointer:?} started dragging {target:?}");
        self.gestures.insert(
            pointer,
            Gesture {
                target,
                last_page: page,
            },
        );
        true
    }

    /// Handles a mouse press in page coordinates. Returns whether a drag
    /// started.
    pub fn pointer_down(&mut self, page: Point, button: MouseButton) -> bool {
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };
        let hit = self.canvas.mouse_down(scene, page, button);
        match hit {
            Some(hit) => self.begin(hit.component, hit.pointer, page),
            None => false,
        }
    }

    /// Handles the changed touches of a touch-start event. Returns how many
    /// drags started.
    pub fn touch_start(&mut self, touches: &[Touch]) -> usize {
        let Some(scene) = self.scene.as_ref() else {
            return 0;
        };
        let hits = self.canvas.touch_start(scene, touches);

        let mut started = 0;
        for hit in hits {
            let page = touches
                .iter()
                .find(|touch| PointerId::Touch(touch.identifier) == hit.pointer)
                .map(|touch| touch.page);
            if let Some(page) = page {
                if self.begin(hit.component, hit.pointer, page) {
                    started += 1;
                }
            }
        }
        started
    }

    /// Feeds a pointer position. Movement is converted from display pixels
    /// to image pixels before it is applied.
    pub fn pointer_move(&mut self, pointer: PointerId, page: Point) -> Result<()> {
        let Some(gesture) = self.gestures.get_mut(&pointer) else {
            return Ok(());
        };
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        let delta = page.offset_from(gesture.last_page).scaled(1.0 / scene.document_scale);
        gesture.last_page = page;
        if delta == Point::ORIGIN {
            return Ok(());
        }

        match gesture.target {
            DragTarget::Corner(corner) => scene.triangle.drag_corner(corner, delta.x, delta.y),
            DragTarget::Triangle => scene.triangle.drag_all(delta.x, delta.y),
        }
        self.draw()
    }

    /// Ends a gesture, fixing the dragged points where they are displayed.
    ///
    /// Returns the final triangle if the pointer was dragging.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<Triangle> {
        let gesture = self.gestures.remove(&pointer)?;
        let scene = self.scene.as_mut()?;

        match gesture.target {
            DragTarget::Corner(corner) => scene.triangle.finalize_corner(corner),
            DragTarget::Triangle => scene.triangle.finalize(),
        }
        debug!("{pointer:?} finished dragging {:?}", gesture.target);
        Some(scene.triangle.triangle())
    }

    /// A cancelled touch ends its gesture the same way a release does.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<Triangle> {
        self.pointer_up(pointer)
    }

    pub fn is_dragging_pointer(&self, pointer: PointerId) -> bool {
        self.gestures.contains_key(&pointer)
    }
}
