//! Best-effort media probing done before a track is handed to the engine.
//!
//! The values produced here are advisory only. A failed probe is logged and
//! recovered as "unknown"; it never reaches the controller as an error.

use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;

use crate::error::PlayerError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub duration: Option<Duration>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl MediaInfo {
    pub fn unknown() -> Self {
        Self::default()
    }
}

pub trait MediaInfoResolver {
    fn resolve(&self, locator: &Path) -> MediaInfo;
}

/// Tag/property reader backed by `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyResolver;

impl LoftyResolver {
    fn read_info(path: &Path) -> Result<MediaInfo, PlayerError> {
        let tagged = lofty::read_from_path(path).map_err(|e| PlayerError::MetadataUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let duration = tagged.properties().duration();
        let mut info = MediaInfo {
            duration: (!duration.is_zero()).then_some(duration),
            ..MediaInfo::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            info.title = non_blank(tag.title().as_deref());
            info.artist = non_blank(tag.artist().as_deref());
        }

        Ok(info)
    }
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl MediaInfoResolver for LoftyResolver {
    fn resolve(&self, locator: &Path) -> MediaInfo {
        match Self::read_info(locator) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("{e}; duration treated as unknown");
                MediaInfo::unknown()
            }
        }
    }
}
