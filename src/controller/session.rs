use std::time::Duration;

use crate::engine::EngineState;

/// The playback state of the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

impl From<EngineState> for PlaybackState {
    fn from(state: EngineState) -> Self {
        match state {
            EngineState::Stopped => Self::Stopped,
            EngineState::Playing => Self::Playing,
            EngineState::Paused => Self::Paused,
        }
    }
}

/// Snapshot of everything presentation code needs to render transport state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    /// Index of the active playlist item, if any.
    pub current_index: Option<usize>,
    pub state: PlaybackState,
    pub position: Duration,
    pub duration: Duration,
    /// Volume in percent, `0..=100`.
    pub volume: u8,
    /// Presentation flag only; set exactly when `volume == 0`.
    pub muted: bool,
}

impl PlaybackSession {
    pub fn new(volume: u8) -> Self {
        let volume = volume.min(100);
        Self {
            current_index: None,
            state: PlaybackState::Stopped,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume,
            muted: volume == 0,
        }
    }

    pub fn has_track(&self) -> bool {
        self.current_index.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn position_ms(&self) -> u64 {
        self.position.as_millis() as u64
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    pub(super) fn rewind(&mut self) {
        self.position = Duration::ZERO;
    }

    /// Forget the active item entirely.
    pub(super) fn clear_active(&mut self) {
        self.current_index = None;
        self.state = PlaybackState::Stopped;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
    }
}
