//! Playback controller: the state machine between user intents, the playlist
//! and the media engine.
//!
//! `PlaybackController` lives in `controller::machine`, the session snapshot
//! it maintains in `controller::session`, and the notification contract for
//! presentation layers in `controller::observer`.

mod machine;
mod observer;
mod session;

pub use machine::PlaybackController;
pub use observer::PlayerObserver;
pub use session::{PlaybackSession, PlaybackState};

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;
