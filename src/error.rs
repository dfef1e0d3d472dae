//! Error types shared by the playlist, controller and engine layers.
//!
//! None of these are fatal to the controller: callers either surface them on
//! the status line or recover with a safe default.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// A playlist index outside `[0, len)`.
    #[error("index {index} is out of range for a playlist of {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// An operation that needs a loaded track was requested with none active.
    #[error("no active track")]
    NoActiveTrack,

    /// Tag/property probing failed; recovered locally as an unknown duration.
    #[error("metadata unavailable for {}: {reason}", path.display())]
    MetadataUnavailable { path: PathBuf, reason: String },

    /// The media engine could not carry out a request.
    #[error("media engine: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
