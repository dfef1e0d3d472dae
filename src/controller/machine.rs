use std::time::Duration;

use crate::engine::{EngineEvent, EngineReport, LoadToken, MediaEngine};
use crate::error::{PlayerError, Result};
use crate::playlist::{Playlist, Track};

use super::observer::PlayerObserver;
use super::session::{PlaybackSession, PlaybackState};

/// Owns the playlist and the session and is the only thing that talks to the
/// engine.
///
/// All methods run on the caller's thread. User intents and engine reports
/// are expected to be fed in one at a time from a single event loop.
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    playlist: Playlist,
    session: PlaybackSession,
    observers: Vec<Box<dyn PlayerObserver>>,
    last_token: LoadToken,
    /// Token of the media the engine currently holds for `current_index`.
    active_token: Option<LoadToken>,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(mut engine: E, initial_volume: u8) -> Self {
        let session = PlaybackSession::new(initial_volume);
        engine.set_volume(f32::from(session.volume) / 100.0);
        Self {
            engine,
            playlist: Playlist::new(),
            session,
            observers: Vec::new(),
            last_token: LoadToken::default(),
            active_token: None,
        }
    }

    /// Register an observer and hand it the current snapshots right away.
    pub fn subscribe(&mut self, mut observer: Box<dyn PlayerObserver>) {
        observer.on_playlist_changed(self.playlist.tracks());
        observer.on_session_changed(&self.session);
        self.observers.push(observer);
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session
            .current_index
            .and_then(|i| self.playlist.get(i).ok())
    }

    /// Replace the playlist with `track` and start playing it.
    pub fn open_new(&mut self, track: Track) {
        log::info!("opening {}", track.locator.display());
        self.playlist.clear();
        let index = self.playlist.append(track);
        self.notify_playlist();
        if let Err(e) = self.load_and_play(index) {
            // Unreachable: the index was just appended.
            log::error!("open failed: {e}");
        }
        self.notify_session();
    }

    /// Append `track` without touching playback, even if nothing is loaded.
    pub fn add_to_playlist(&mut self, track: Track) -> usize {
        log::debug!("adding {}", track.locator.display());
        let index = self.playlist.append(track);
        self.notify_playlist();
        index
    }

    /// Pause when playing, otherwise (re)start the active item.
    pub fn toggle_play(&mut self) -> Result<()> {
        let Some(index) = self.session.current_index else {
            log::debug!("play/pause ignored: no active track");
            return Err(PlayerError::NoActiveTrack);
        };

        match self.session.state {
            PlaybackState::Playing => {
                self.engine.pause();
                self.session.state = PlaybackState::Paused;
            }
            PlaybackState::Stopped | PlaybackState::Paused => {
                if self.active_token.is_none() {
                    // The last load failed; try it again.
                    self.load_and_play(index)?;
                } else {
                    self.engine.play();
                    self.session.state = PlaybackState::Playing;
                }
            }
        }
        self.notify_session();
        Ok(())
    }

    /// Stop and rewind. The active item stays selected.
    pub fn stop(&mut self) {
        self.engine.stop();
        self.session.state = PlaybackState::Stopped;
        self.session.rewind();
        self.notify_session();
    }

    /// Move the position by `delta_ms`, clamped to `[0, duration]`.
    pub fn seek_by(&mut self, delta_ms: i64) -> Result<()> {
        self.require_track("seek")?;
        let current = i64::try_from(self.session.position.as_millis()).unwrap_or(i64::MAX);
        let target = current.saturating_add(delta_ms).max(0);
        self.apply_seek(Duration::from_millis(u64::try_from(target).unwrap_or(0)));
        Ok(())
    }

    /// Jump to an absolute position, clamped to `[0, duration]`.
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        self.require_track("seek")?;
        self.apply_seek(position);
        Ok(())
    }

    /// Load and play the item at `index`, or the first item when `None`.
    ///
    /// `None` on an empty playlist is a no-op.
    pub fn select_and_play(&mut self, index: Option<usize>) -> Result<()> {
        let index = match index {
            Some(i) => i,
            None if self.playlist.is_empty() => {
                log::debug!("nothing to play: playlist is empty");
                return Ok(());
            }
            None => 0,
        };
        self.load_and_play(index)?;
        self.notify_session();
        Ok(())
    }

    /// Remove the item at `index`.
    ///
    /// Removing the active item stops the engine first and then moves on to
    /// the item that took its place (wrapping to the start). Removing any other
    /// item keeps the active one playing and shifts `current_index` as needed.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        let removed = match self.session.current_index {
            Some(current) if current == index => {
                self.engine.stop();
                self.active_token = None;
                let removed = self.playlist.remove_at(index)?;
                log::info!("removed active item {}", removed.locator.display());
                self.notify_playlist();

                if self.playlist.is_empty() {
                    self.session.clear_active();
                } else {
                    let next = if index < self.playlist.len() { index } else { 0 };
                    self.load_and_play(next)?;
                }
                removed
            }
            current => {
                let removed = self.playlist.remove_at(index)?;
                log::debug!("removed {}", removed.locator.display());
                if let Some(c) = current {
                    if index < c {
                        self.session.current_index = Some(c - 1);
                    }
                }
                self.notify_playlist();
                removed
            }
        };
        self.notify_session();
        Ok(removed)
    }

    /// Play the following item, wrapping from the last back to the first.
    pub fn advance_to_next(&mut self) -> Result<()> {
        let Some(last) = self.playlist.last_index() else {
            self.go_idle();
            return Ok(());
        };
        let next = match self.session.current_index {
            Some(i) if i >= last => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.select_and_play(Some(next))
    }

    /// Play the preceding item, wrapping from the first to the last.
    pub fn advance_to_previous(&mut self) -> Result<()> {
        let Some(last) = self.playlist.last_index() else {
            self.go_idle();
            return Ok(());
        };
        let prev = match self.session.current_index {
            Some(0) | None => last,
            Some(i) => (i - 1).min(last),
        };
        self.select_and_play(Some(prev))
    }

    pub fn on_end_of_media(&mut self) -> Result<()> {
        log::debug!("end of media at {:?}", self.session.current_index);
        self.advance_to_next()
    }

    /// Copy an engine position report into the session.
    pub fn on_position(&mut self, position: Duration) {
        self.session.position = self.clamp_to_duration(position);
        self.notify_session();
    }

    /// Copy an engine duration report into the session.
    pub fn on_duration(&mut self, duration: Duration) {
        self.session.duration = duration;
        self.session.position = self.clamp_to_duration(self.session.position);
        self.notify_session();
    }

    /// Set the volume in percent; values outside `0..=100` are clamped.
    pub fn set_volume(&mut self, percent: i32) {
        let volume = percent.clamp(0, 100) as u8;
        self.session.volume = volume;
        self.session.muted = volume == 0;
        self.engine.set_volume(f32::from(volume) / 100.0);
        self.notify_session();
    }

    pub fn nudge_volume(&mut self, delta: i32) {
        self.set_volume(i32::from(self.session.volume) + delta);
    }

    /// Dispatch one engine report. Reports about media that is no longer
    /// loaded are dropped.
    pub fn handle_engine_report(&mut self, report: EngineReport) -> Result<()> {
        if self.active_token != Some(report.token) {
            log::trace!("dropping stale engine report {}: {:?}", report.token, report.event);
            return Ok(());
        }

        match report.event {
            EngineEvent::Loaded { duration } => {
                if let Some(d) = duration {
                    self.on_duration(d);
                }
            }
            EngineEvent::LoadFailed(msg) => {
                self.active_token = None;
                self.session.state = PlaybackState::Stopped;
                self.session.rewind();
                self.notify_session();
                return Err(PlayerError::Engine(msg));
            }
            EngineEvent::StateChanged(state) => {
                let state = PlaybackState::from(state);
                if self.session.state != state {
                    self.session.state = state;
                    self.notify_session();
                }
            }
            EngineEvent::PositionChanged(p) => self.on_position(p),
            EngineEvent::DurationChanged(d) => self.on_duration(d),
            // May have been emitted before a queued stop or pause ran.
            EngineEvent::EndOfMedia if self.session.state != PlaybackState::Playing => {
                log::trace!("ignoring end of media while {:?}", self.session.state);
            }
            EngineEvent::EndOfMedia => return self.on_end_of_media(),
        }
        Ok(())
    }

    /// Stop output and release the engine.
    pub fn shutdown(&mut self, fade_out: Duration) {
        log::info!("shutting down playback");
        self.engine.shutdown(fade_out);
        self.active_token = None;
        self.session.state = PlaybackState::Stopped;
        self.notify_session();
    }

    fn load_and_play(&mut self, index: usize) -> Result<()> {
        let track = self.playlist.get(index)?;
        let locator = track.locator.clone();
        let advisory = track.duration;

        self.last_token = self.last_token.next();
        let token = self.last_token;
        self.active_token = Some(token);

        self.session.current_index = Some(index);
        self.session.state = PlaybackState::Playing;
        self.session.position = Duration::ZERO;
        self.session.duration = advisory.unwrap_or_default();

        log::info!("playing [{index}] {} ({token})", locator.display());
        self.engine.load(&locator, token);
        self.engine.play();
        Ok(())
    }

    fn apply_seek(&mut self, position: Duration) {
        let target = self.session.duration.min(position);
        self.engine.seek_to(target);
        self.session.position = target;
        self.notify_session();
    }

    fn require_track(&self, what: &str) -> Result<()> {
        if self.session.has_track() {
            Ok(())
        } else {
            log::debug!("{what} ignored: no active track");
            Err(PlayerError::NoActiveTrack)
        }
    }

    /// Position may only exceed the duration while the duration is unknown.
    fn clamp_to_duration(&self, position: Duration) -> Duration {
        if self.session.duration.is_zero() {
            position
        } else {
            position.min(self.session.duration)
        }
    }

    fn go_idle(&mut self) {
        self.active_token = None;
        self.session.clear_active();
        self.notify_session();
    }

    fn notify_session(&mut self) {
        for o in &mut self.observers {
            o.on_session_changed(&self.session);
        }
    }

    fn notify_playlist(&mut self) {
        for o in &mut self.observers {
            o.on_playlist_changed(self.playlist.tracks());
        }
    }
}
