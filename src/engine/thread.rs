use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::sink::create_sink_at;
use super::types::{EngineCmd, EngineEvent, EngineReport, EngineState, LoadToken};

/// Media the engine currently holds, whether or not a sink is alive for it.
struct Loaded {
    path: PathBuf,
    token: LoadToken,
}

/// State owned by the engine thread.
struct Deck {
    stream: OutputStream,
    reports: Sender<EngineReport>,
    loaded: Option<Loaded>,
    sink: Option<Sink>,
    playing: bool,
    volume: f32,
}

impl Deck {
    fn report(&self, event: EngineEvent) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        self.report_for(loaded.token, event);
    }

    fn report_for(&self, token: LoadToken, event: EngineEvent) {
        // The receiver only goes away during shutdown.
        let _ = self.reports.send(EngineReport { token, event });
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Make sure a sink exists for the loaded media, rebuilding it at
    /// `start_at` after a stop.
    fn ensure_sink(&mut self, start_at: Duration) -> bool {
        if self.sink.is_some() {
            return true;
        }
        let Some(loaded) = &self.loaded else {
            return false;
        };
        match create_sink_at(&self.stream, &loaded.path, start_at, self.volume) {
            Ok(prepared) => {
                self.sink = Some(prepared.sink);
                true
            }
            Err(msg) => {
                log::error!("engine: {msg}");
                self.report(EngineEvent::LoadFailed(msg));
                false
            }
        }
    }

    fn load(&mut self, path: PathBuf, token: LoadToken) {
        self.drop_sink();
        self.playing = false;

        match create_sink_at(&self.stream, &path, Duration::ZERO, self.volume) {
            Ok(prepared) => {
                log::debug!("engine: loaded {} as {token}", path.display());
                self.sink = Some(prepared.sink);
                self.loaded = Some(Loaded { path, token });
                self.report(EngineEvent::Loaded {
                    duration: prepared.duration,
                });
                if let Some(d) = prepared.duration {
                    self.report(EngineEvent::DurationChanged(d));
                }
                self.report(EngineEvent::PositionChanged(Duration::ZERO));
            }
            Err(msg) => {
                log::error!("engine: {msg}");
                self.loaded = None;
                self.report_for(token, EngineEvent::LoadFailed(msg));
            }
        }
    }

    fn play(&mut self) {
        if !self.ensure_sink(Duration::ZERO) {
            return;
        }
        if let Some(s) = &self.sink {
            s.play();
        }
        self.playing = true;
        self.report(EngineEvent::StateChanged(EngineState::Playing));
    }

    fn pause(&mut self) {
        let Some(s) = &self.sink else {
            return;
        };
        s.pause();
        self.playing = false;
        self.report(EngineEvent::StateChanged(EngineState::Paused));
    }

    fn stop(&mut self) {
        // rodio has no rewind-on-stop; the sink is rebuilt on the next play.
        self.drop_sink();
        self.playing = false;
        self.report(EngineEvent::PositionChanged(Duration::ZERO));
        self.report(EngineEvent::StateChanged(EngineState::Stopped));
    }

    fn seek_to(&mut self, position: Duration) {
        if self.sink.is_none() {
            // Stopped: build a paused sink already positioned.
            if self.ensure_sink(position) {
                self.report(EngineEvent::PositionChanged(position));
            }
            return;
        }
        if let Some(s) = &self.sink {
            if let Err(e) = s.try_seek(position) {
                log::warn!("engine: seek to {position:?} failed: {e}");
            }
            let pos = s.get_pos();
            self.report(EngineEvent::PositionChanged(pos));
        }
    }

    fn set_volume(&mut self, fraction: f32) {
        self.volume = fraction.clamp(0.0, 1.0);
        if let Some(s) = &self.sink {
            s.set_volume(self.volume);
        }
    }

    /// Periodic position publish and end-of-media detection.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(s) = &self.sink else {
            return;
        };
        if s.empty() {
            self.playing = false;
            self.report(EngineEvent::EndOfMedia);
        } else {
            let pos = s.get_pos();
            self.report(EngineEvent::PositionChanged(pos));
        }
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    reports: Sender<EngineReport>,
    ready: SyncSender<Result<(), String>>,
    position_interval: Duration,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(format!("no audio output device: {e}")));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut deck = Deck {
            stream,
            reports,
            loaded: None,
            sink: None,
            playing: false,
            volume: initial_volume,
        };

        loop {
            match rx.recv_timeout(position_interval) {
                Ok(cmd) => match cmd {
                    EngineCmd::Load { path, token } => deck.load(path, token),
                    EngineCmd::Play => deck.play(),
                    EngineCmd::Pause => deck.pause(),
                    EngineCmd::Stop => deck.stop(),
                    EngineCmd::SeekTo(pos) => deck.seek_to(pos),
                    EngineCmd::SetVolume(v) => deck.set_volume(v),
                    EngineCmd::Quit { fade_out_ms } => {
                        if let Some(ref s) = deck.sink {
                            if deck.playing {
                                fade_out_sink(s, deck.volume, fade_out_ms);
                            }
                        }
                        deck.drop_sink();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("engine thread exiting");
    })
}
