use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::media_info::{MediaInfo, MediaInfoResolver};

/// A single playlist entry. Immutable once added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub locator: PathBuf,
    /// Advisory duration; the engine's report is authoritative once loaded.
    pub duration: Option<Duration>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub label: String,
}

impl Track {
    pub fn new(locator: impl Into<PathBuf>, info: MediaInfo) -> Self {
        let locator = locator.into();
        let label = make_label(&locator, info.duration);
        Self {
            locator,
            duration: info.duration,
            title: info.title,
            artist: info.artist,
            label,
        }
    }

    /// Build a track, asking `resolver` for its advisory metadata.
    pub fn probe(locator: &Path, resolver: &dyn MediaInfoResolver) -> Self {
        Self::new(locator, resolver.resolve(locator))
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.locator)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Playlist row text: `"<file name>  --  <seconds> seconds"`.
pub(super) fn make_label(path: &Path, duration: Option<Duration>) -> String {
    let secs = duration.map_or(0, |d| d.as_secs());
    format!("{}  --  {} seconds", file_name_of(path), secs)
}
