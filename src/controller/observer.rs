use crate::playlist::Track;

use super::session::PlaybackSession;

/// Notification contract for presentation layers.
///
/// Fired after every state-affecting controller operation. Observers render
/// from the snapshots they are handed and never mutate the controller.
pub trait PlayerObserver {
    fn on_session_changed(&mut self, session: &PlaybackSession);
    fn on_playlist_changed(&mut self, tracks: &[Track]);
}
