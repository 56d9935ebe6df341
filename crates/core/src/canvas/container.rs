//! A surface holding an ordered list of drawable, hit-testable components.

use tiny_skia::Pixmap;

use super::Surface;
use crate::error::Result;
use crate::geometry::Point;

/// A child of a [`CanvasContainer`].
///
/// Components are lightweight keys; the state they draw and hit-test lives
/// in the scene `S` handed to every call, so the container never has to
/// share ownership of it.
pub trait CanvasComponent<S: ?Sized> {
    /// Draws this component in the surface's current coordinate space.
    fn draw(&self, scene: &S, surface: &mut Surface) -> Result<()>;

    /// Whether `point` (in hit-test space) falls on this component.
    fn contains(&self, scene: &S, point: Point) -> bool;
}

/// Identifies the source of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// One changed touch of a touch-start event, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub identifier: u64,
    pub page: Point,
}

/// The component that a gesture start landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<C> {
    pub component: C,
    /// The pointer position in hit-test space.
    pub point: Point,
    pub pointer: PointerId,
}

/// Maps surface-local points into the space components are hit-tested in:
/// `(local - padding) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSpace {
    pub padding: f64,
    pub scale: f64,
}

impl Default for HitSpace {
    fn default() -> Self {
        Self {
            padding: 0.0,
            scale: 1.0,
        }
    }
}

impl HitSpace {
    pub fn apply(&self, mut point: Point) -> Point {
        point.move_by(-self.padding);
        point.scale(1.0 / self.scale);
        point
    }
}

/// Owns a drawing surface and its components, and resolves gesture starts.
pub struct CanvasContainer<C> {
    surface: Surface,
    components: Vec<C>,
    offset: Point,
    hit_space: HitSpace,
}

impl<C: Copy + PartialEq> CanvasContainer<C> {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            components: Vec::new(),
            offset: Point::ORIGIN,
            hit_space: HitSpace::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface.resize(width, height)
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.surface.translate(x, y);
    }

    /// An independent copy of the current raster content.
    pub fn canvas_snapshot(&self) -> Pixmap {
        self.surface.snapshot()
    }

    /// Sets where the surface sits on the page, for pointer conversion.
    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_hit_space(&mut self, hit_space: HitSpace) {
        self.hit_space = hit_space;
    }

    pub fn hit_space(&self) -> HitSpace {
        self.hit_space
    }

    /// Converts a page position into surface-local coordinates.
    pub fn to_local(&self, page: Point) -> Point {
        page - self.offset
    }

    pub fn add_component(&mut self, component: C) {
        self.components.push(component);
    }

    /// Removes the first occurrence of `component`, if present.
    pub fn remove_component(&mut self, component: C) {
        if let Some(index) = self.components.iter().position(|c| *c == component) {
            self.components.remove(index);
        }
    }

    pub fn clear_components(&mut self) {
        self.components.clear();
    }

    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Clears the surface and draws every component in order, so later
    /// components paint over earlier ones.
    pub fn draw<S: ?Sized>(&mut self, scene: &S) -> Result<()>
    where
        C: CanvasComponent<S>,
    {
        self.surface.clear();
        for component in &self.components {
            component.draw(scene, &mut self.surface)?;
        }
        Ok(())
    }

    /// The front-most component containing `point` (in hit-test space).
    pub fn component_at<S: ?Sized>(&self, scene: &S, point: Point) -> Option<C>
    where
        C: CanvasComponent<S>,
    {
        self.components
            .iter()
            .rev()
            .find(|component| component.contains(scene, point))
            .copied()
    }

    fn hit<S: ?Sized>(&self, scene: &S, page: Point, pointer: PointerId) -> Option<Hit<C>>
    where
        C: CanvasComponent<S>,
    {
        let point = self.hit_space.apply(self.to_local(page));
        self.component_at(scene, point).map(|component| Hit {
            component,
            point,
            pointer,
        })
    }

    /// Resolves a mouse press. Only the primary button starts a gesture.
    pub fn mouse_down<S: ?Sized>(&self, scene: &S, page: Point, button: MouseButton) -> Option<Hit<C>>
    where
        C: CanvasComponent<S>,
    {
        if button != MouseButton::Primary {
            return None;
        }
        self.hit(scene, page, PointerId::Mouse)
    }

    /// Resolves each changed touch independently.
    pub fn touch_start<S: ?Sized>(&self, scene: &S, touches: &[Touch]) -> Vec<Hit<C>>
    where
        C: CanvasComponent<S>,
    {
        touches
            .iter()
            .filter_map(|touch| self.hit(scene, touch.page, PointerId::Touch(touch.identifier)))
            .collect()
    }
}
