//! UI state types.
//!
//! The session owns the real settings; these are the values as the user is
//! editing them, committed when an edit finishes.

use crate::session::{Notice, Session};

/// Editable copies of the numeric controls.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub tile_scale: f64,
    pub save_width: f64,
    pub save_height: f64,
}

impl Controls {
    /// Reads the committed values back from the session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            tile_scale: session.tile_scale() as f64,
            save_width: session.save_width() as f64,
            save_height: session.save_height() as f64,
        }
    }
}

/// The message shown in the status bar.
///
/// Shows the most recent notice until it is dismissed or replaced.
#[derive(Clone, Debug, Default)]
pub struct StatusLine {
    current: Option<Notice>,
}

impl StatusLine {
    pub fn push(&mut self, notices: Vec<Notice>) {
        if let Some(notice) = notices.into_iter().last() {
            self.current = Some(notice);
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
