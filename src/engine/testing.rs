//! A recording engine for controller tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::MediaEngine;
use super::types::LoadToken;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf, LoadToken),
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    SetVolume(f32),
    Shutdown,
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<EngineCall>,
}

impl FakeEngine {
    /// Calls with load tokens stripped, for easier assertions.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|c| match c {
                EngineCall::Load(p, _) => format!("load {}", p.display()),
                EngineCall::Play => "play".to_string(),
                EngineCall::Pause => "pause".to_string(),
                EngineCall::Stop => "stop".to_string(),
                EngineCall::SeekTo(d) => format!("seek {}", d.as_millis()),
                EngineCall::SetVolume(v) => format!("volume {v:.2}"),
                EngineCall::Shutdown => "shutdown".to_string(),
            })
            .collect()
    }

    pub fn last_token(&self) -> Option<LoadToken> {
        self.calls.iter().rev().find_map(|c| match c {
            EngineCall::Load(_, t) => Some(*t),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, locator: &Path, token: LoadToken) {
        self.calls.push(EngineCall::Load(locator.to_path_buf(), token));
    }

    fn play(&mut self) {
        self.calls.push(EngineCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(EngineCall::Pause);
    }

    fn stop(&mut self) {
        self.calls.push(EngineCall::Stop);
    }

    fn seek_to(&mut self, position: Duration) {
        self.calls.push(EngineCall::SeekTo(position));
    }

    fn set_volume(&mut self, fraction: f32) {
        self.calls.push(EngineCall::SetVolume(fraction));
    }

    fn shutdown(&mut self, _fade_out: Duration) {
        self.calls.push(EngineCall::Shutdown);
    }
}
