//! Interactive pattern editor.
//!
//! Wraps a [`Session`] in an eframe window: the triangle selector on the
//! left and the live preview filling the rest.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: Control values and the status line
//! - [`rendering`]: Surface to texture uploads
//! - [`selection`]: Pointer input for the selector
//! - `app`: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use cats_eye_core::{ui, Config, Session};
//!
//! let config = Config::load()?;
//! let mut session = Session::new(&config)?;
//! session.reload_last_image()?;
//! ui::run_pattern_ui(session)?;
//! ```

mod app;
mod rendering;
mod selection;
mod state;

pub use app::CatsEyeApp;
pub use selection::SelectionEvent;
pub use state::{Controls, StatusLine};

use crate::error::Result;
use crate::session::Session;

/// Opens the editor window for `session`.
///
/// Returns once the window is closed. Everything the user does is persisted
/// through the session as it happens, so there is nothing to hand back.
pub fn run_pattern_ui(session: Session) -> Result<()> {
    app::run(session)
}
