//! Application module: exposes the view model used by the TUI and runtime.
//!
//! `App` in `app::model` holds the cursor, input mode and other purely
//! presentational state. Playback itself lives in the controller.

mod model;

pub use model::*;
