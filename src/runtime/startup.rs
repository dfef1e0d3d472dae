use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::LibrarySettings;
use crate::controller::PlaybackController;
use crate::engine::MediaEngine;
use crate::error::Result;
use crate::media_info::MediaInfoResolver;
use crate::playlist::{Track, collect_media};

/// Turn a typed path into a `PathBuf`, expanding a leading `~`.
pub fn expand_user_path(input: &str) -> PathBuf {
    expand_with_home(input, env::var_os("HOME"))
}

pub(super) fn expand_with_home(input: &str, home: Option<OsString>) -> PathBuf {
    let input = input.trim();
    if input == "~" || input.starts_with("~/") {
        if let Some(home) = home {
            let rest = input.trim_start_matches('~').trim_start_matches('/');
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(input)
}

/// Expand `paths` to media files and probe each one.
pub fn tracks_from_paths(
    paths: &[PathBuf],
    library: &LibrarySettings,
    resolver: &dyn MediaInfoResolver,
) -> Vec<Track> {
    collect_media(paths, library)
        .iter()
        .map(|p| Track::probe(p, resolver))
        .collect()
}

/// Append every media file found under `paths`. Returns how many were added.
pub fn add_paths<E: MediaEngine>(
    controller: &mut PlaybackController<E>,
    paths: &[PathBuf],
    library: &LibrarySettings,
    resolver: &dyn MediaInfoResolver,
) -> usize {
    let tracks = tracks_from_paths(paths, library, resolver);
    let added = tracks.len();
    for track in tracks {
        controller.add_to_playlist(track);
    }
    log::info!("queued {added} item(s)");
    added
}

/// Replace the playlist with the media found under `paths` and play the first.
///
/// Nothing changes when no media is found.
pub fn open_paths<E: MediaEngine>(
    controller: &mut PlaybackController<E>,
    paths: &[PathBuf],
    library: &LibrarySettings,
    resolver: &dyn MediaInfoResolver,
) -> usize {
    let mut tracks = tracks_from_paths(paths, library, resolver).into_iter();
    let Some(first) = tracks.next() else {
        return 0;
    };
    controller.open_new(first);
    let mut count = 1;
    for track in tracks {
        controller.add_to_playlist(track);
        count += 1;
    }
    count
}

/// Queue the paths given on the command line, optionally starting playback.
pub fn apply_cli_paths<E: MediaEngine>(
    controller: &mut PlaybackController<E>,
    paths: &[PathBuf],
    autoplay: bool,
    library: &LibrarySettings,
    resolver: &dyn MediaInfoResolver,
) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let added = add_paths(controller, paths, library, resolver);
    if added == 0 {
        log::warn!("no playable media found in the given paths");
    }
    if autoplay {
        controller.select_and_play(None)?;
    }
    Ok(())
}
