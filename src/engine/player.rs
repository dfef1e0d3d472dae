use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::error::PlayerError;

use super::MediaEngine;
use super::thread::spawn_engine_thread;
use super::types::{EngineCmd, EngineReport, LoadToken};

/// `MediaEngine` backed by a `rodio` output stream on a dedicated thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Open the default output device and start the engine thread.
    ///
    /// Returns the engine and the receiving end of its report channel.
    pub fn spawn(settings: &AudioSettings) -> Result<(Self, Receiver<EngineReport>), PlayerError> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (report_tx, report_rx) = mpsc::channel::<EngineReport>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        let join = spawn_engine_thread(
            rx,
            report_tx,
            ready_tx,
            Duration::from_millis(settings.position_interval_ms.max(1)),
            f32::from(settings.initial_volume.min(100)) / 100.0,
        );

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => {
                let _ = join.join();
                return Err(PlayerError::Engine(msg));
            }
            Err(_) => {
                let _ = join.join();
                return Err(PlayerError::Engine(
                    "engine thread exited during startup".to_string(),
                ));
            }
        }

        log::info!("audio engine started");
        Ok((
            Self {
                tx,
                join: Some(join),
            },
            report_rx,
        ))
    }

    fn send(&self, cmd: EngineCmd) {
        if let Err(e) = self.tx.send(cmd) {
            log::error!("engine thread is gone, dropped {:?}", e.0);
        }
    }
}

impl MediaEngine for RodioEngine {
    fn load(&mut self, locator: &Path, token: LoadToken) {
        self.send(EngineCmd::Load {
            path: locator.to_path_buf(),
            token,
        });
    }

    fn play(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(EngineCmd::Stop);
    }

    fn seek_to(&mut self, position: Duration) {
        self.send(EngineCmd::SeekTo(position));
    }

    fn set_volume(&mut self, fraction: f32) {
        self.send(EngineCmd::SetVolume(fraction));
    }

    fn shutdown(&mut self, fade_out: Duration) {
        let Some(join) = self.join.take() else {
            return;
        };
        self.send(EngineCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        let _ = join.join();
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.shutdown(Duration::ZERO);
    }
}
