//! Media engine: the decode/output side the controller drives.
//!
//! `MediaEngine` is the command surface the controller talks to. Engines
//! answer asynchronously with `EngineReport`s stamped with the `LoadToken` of
//! the media they concern, so reports about media that has since been
//! replaced can be told apart and dropped.

mod player;
mod sink;
#[cfg(test)]
pub mod testing;
mod thread;
mod types;

use std::path::Path;
use std::time::Duration;

pub use player::RodioEngine;
pub use types::{EngineEvent, EngineReport, EngineState, LoadToken};

pub trait MediaEngine {
    /// Replace the current media. Commands are processed in order, so a
    /// following `play` always applies to this media.
    fn load(&mut self, locator: &Path, token: LoadToken);
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop and rewind to the start of the current media.
    fn stop(&mut self);
    fn seek_to(&mut self, position: Duration);
    /// `fraction` is in `0.0..=1.0`.
    fn set_volume(&mut self, fraction: f32);
    /// Stop output and release the engine, fading out over `fade_out`.
    fn shutdown(&mut self, fade_out: Duration);
}
