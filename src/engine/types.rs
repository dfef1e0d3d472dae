//! Engine-side message types.
//!
//! Commands flow to the engine thread as `EngineCmd`, reports flow back as
//! `EngineReport`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Identifies one `load` request. Issued by the controller, increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The media is decoded and ready; `duration` is authoritative when known.
    Loaded { duration: Option<Duration> },
    LoadFailed(String),
    StateChanged(EngineState),
    PositionChanged(Duration),
    DurationChanged(Duration),
    EndOfMedia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineReport {
    pub token: LoadToken,
    pub event: EngineEvent,
}

#[derive(Debug)]
pub(super) enum EngineCmd {
    /// Open and decode `path`, leaving it paused at the start.
    Load { path: PathBuf, token: LoadToken },
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    SetVolume(f32),
    /// Quit the engine thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
