//! Drawing surfaces and the component container used by the selector and
//! the renderer.

mod container;
mod surface;

pub use container::{
    CanvasComponent, CanvasContainer, Hit, HitSpace, MouseButton, PointerId, Touch,
};
pub use surface::{triangle_path, Surface, MAX_SURFACE_DIMENSION};
