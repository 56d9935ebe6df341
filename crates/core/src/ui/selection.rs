//! Selection handling and coordinate mapping.
//!
//! egui reports pointer positions in points relative to the window; the
//! selector works in surface pixels. Everything is scaled by
//! `pixels_per_point` on the way in.

use eframe::egui;
use log::warn;

use crate::canvas::{MouseButton, PointerId};
use crate::geometry::Point;
use crate::session::Session;

/// Result of processing selection input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// A drag started on a handle or the triangle.
    Started,
    /// The active drag moved.
    Dragging,
    /// The drag ended and the triangle was stored.
    Released,
    /// No selection event occurred.
    None,
}

/// Converts a window position into page pixels.
pub fn to_page(pos: egui::Pos2, pixels_per_point: f32) -> Point {
    Point::new(
        f64::from(pos.x * pixels_per_point),
        f64::from(pos.y * pixels_per_point),
    )
}

/// Feeds the drag state of the selector image into the session.
///
/// # Arguments
/// * `response` - The egui response of the selector image
/// * `session` - The session owning the selection
/// * `pixels_per_point` - Display scaling of the current frame
pub fn process_drag_event(
    response: &egui::Response,
    session: &mut Session,
    pixels_per_point: f32,
) -> SelectionEvent {
    session.set_selection_offset(to_page(response.rect.min, pixels_per_point));

    if response.drag_started_by(egui::PointerButton::Primary) {
        // The press happened where the drag began, not where the pointer
        // is now.
        let origin = response
            .ctx
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(origin) = origin {
            let page = to_page(origin, pixels_per_point);
            if session.pointer_down(page, MouseButton::Primary) {
                move_to_pointer(response, session, pixels_per_point);
                return SelectionEvent::Started;
            }
        }
        return SelectionEvent::None;
    }

    if response.dragged() && session.selection().is_dragging_pointer(PointerId::Mouse) {
        move_to_pointer(response, session, pixels_per_point);
        return SelectionEvent::Dragging;
    }

    if response.drag_stopped() && session.selection().is_dragging_pointer(PointerId::Mouse) {
        session.pointer_up(PointerId::Mouse);
        return SelectionEvent::Released;
    }

    SelectionEvent::None
}

fn move_to_pointer(response: &egui::Response, session: &mut Session, pixels_per_point: f32) {
    if let Some(pos) = response.interact_pointer_pos() {
        if let Err(e) = session.pointer_move(PointerId::Mouse, to_page(pos, pixels_per_point)) {
            warn!("Failed to redraw selection: {e}");
        }
    }
}
