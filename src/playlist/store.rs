use crate::error::{PlayerError, Result};

use super::model::Track;

/// Ordered, index-addressed track list.
///
/// Indices stay contiguous after removals. Keeping any external "current
/// index" in step with a removal is the caller's job.
#[derive(Debug, Default, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `track` and return its index.
    pub fn append(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Remove and return the track at `index`; later entries shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<Track> {
        self.check(index)?;
        Ok(self.tracks.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Track> {
        self.check(index)?;
        Ok(&self.tracks[index])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlayerError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            })
        }
    }
}
