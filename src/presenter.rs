//! Translation of a `PlaybackSession` into transport affordances.
//!
//! This is the toolkit-independent half of the presentation layer: which
//! controls are enabled, which icons to show and where the position slider
//! sits. Frontends render from a `TransportView` and never inspect the
//! controller's internals.

use crate::controller::{PlaybackSession, PlaybackState};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeIcon {
    Normal,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportView {
    pub play_enabled: bool,
    pub stop_enabled: bool,
    pub seek_enabled: bool,
    /// "Run playlist" is possible whenever there is something to run.
    pub run_enabled: bool,
    pub remove_enabled: bool,
    pub play_icon: PlayIcon,
    pub volume_icon: VolumeIcon,
    /// Slider range is `0..=slider_max` in milliseconds.
    pub slider_max: u64,
    pub slider_value: u64,
    pub volume: u8,
}

impl TransportView {
    pub fn from_session(session: &PlaybackSession, playlist_len: usize) -> Self {
        // Transport buttons light up once something has been started and go
        // dark again on stop.
        let engaged = session.has_track() && session.state != PlaybackState::Stopped;

        let slider_max = session.duration_ms();
        Self {
            play_enabled: session.has_track(),
            stop_enabled: engaged,
            seek_enabled: engaged,
            run_enabled: playlist_len > 0,
            remove_enabled: playlist_len > 0,
            play_icon: if session.is_playing() {
                PlayIcon::Pause
            } else {
                PlayIcon::Play
            },
            volume_icon: if session.muted {
                VolumeIcon::Muted
            } else {
                VolumeIcon::Normal
            },
            slider_max,
            slider_value: session.position_ms().min(slider_max),
            volume: session.volume,
        }
    }

    /// Slider fill in `0.0..=1.0`; zero while the duration is unknown.
    pub fn progress_ratio(&self) -> f64 {
        if self.slider_max == 0 {
            0.0
        } else {
            (self.slider_value as f64 / self.slider_max as f64).clamp(0.0, 1.0)
        }
    }
}
