//! MPRIS (D-Bus) bridge.
//!
//! Remote control calls become `ControlCmd`s for the event loop. The other
//! direction is a `PlayerObserver`: controller snapshots are mirrored into
//! shared state and a change notification wakes the D-Bus thread so it can
//! emit `PropertiesChanged`.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    mpsc::{self, Receiver, Sender},
};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface, object_server::InterfaceRef};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::controller::{PlaybackSession, PlaybackState, PlayerObserver};
use crate::playlist::Track;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.mediadeck";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in milliseconds.
    SeekBy(i64),
    /// Absolute seek.
    SetPosition(Duration),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    position_micros: i64,
    volume: f64,
    can_go: bool,
}

/// Observer half of the bridge; owned by the controller once subscribed.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
    tracks: Vec<Track>,
}

fn track_object_path(index: usize) -> Option<OwnedObjectPath> {
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{index}"))
        .ok()
        .map(OwnedObjectPath::from)
}

fn file_url(track: &Track) -> String {
    format!("file://{}", track.locator.display())
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

impl MprisHandle {
    /// Mirror the active item into the shared metadata.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match (index, track) {
            (Some(i), Some(t)) => {
                s.title = Some(t.title.clone().unwrap_or_else(|| t.file_name()));
                s.artist = t.artist.iter().cloned().collect();
                s.url = Some(file_url(t));
                s.length_micros = t.duration.map(micros);
                s.track_id = track_object_path(i);
            }
            _ => {
                s.title = None;
                s.artist.clear();
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }

    fn ping(&self) {
        // The D-Bus thread may be gone (no session bus); nothing to do then.
        let _ = self.notify.send(());
    }
}

impl PlayerObserver for MprisHandle {
    fn on_session_changed(&mut self, session: &PlaybackSession) {
        let track = session.current_index.and_then(|i| self.tracks.get(i));
        let new_id = session.current_index.and_then(track_object_path);
        let new_url = track.map(file_url);

        // The same index can hold a different item after open or remove.
        let changed = {
            let Ok(s) = self.state.lock() else {
                return;
            };
            s.playback != session.state || s.track_id != new_id || s.url != new_url
        };
        if changed {
            self.set_track_metadata(session.current_index, track);
        }

        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.playback = session.state;
        s.position_micros = micros(session.position);
        s.volume = f64::from(session.volume) / 100.0;
        s.can_go = !self.tracks.is_empty();
        if !session.duration.is_zero() {
            let len = Some(micros(session.duration));
            if s.length_micros != len {
                s.length_micros = len;
                drop(s);
                self.ping();
                return;
            }
        }
        drop(s);

        if changed {
            self.ping();
        }
    }

    fn on_playlist_changed(&mut self, tracks: &[Track]) {
        self.tracks = tracks.to_vec();
        let announce = match self.state.lock() {
            Ok(mut s) => {
                let can_go = !tracks.is_empty();
                let flipped = s.can_go != can_go;
                s.can_go = can_go;
                flipped
            }
            Err(_) => false,
        };
        if announce {
            self.ping();
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "mediadeck"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        if self.tx.send(cmd).is_err() {
            log::debug!("mpris: event loop is gone, dropping command");
        }
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    /// Offset is in microseconds.
    fn seek(&self, offset: i64) {
        self.send(ControlCmd::SeekBy(offset / 1000));
    }

    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let current = self.state.lock().ok().and_then(|s| s.track_id.clone());
        // Calls for an item that is no longer active are ignored.
        if current.as_ref().map(|p| p.as_str()) != Some(track_id.as_str()) || position < 0 {
            return;
        }
        self.send(ControlCmd::SetPosition(Duration::from_micros(position as u64)));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.state.lock().map(|s| s.can_go).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.track_id.is_some())
            .unwrap_or(false)
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.track_id.is_some())
            .unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.state.lock().map(|s| s.can_go).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.state.lock().map(|s| s.can_go).unwrap_or(false)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            put("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        if let Some(title) = &s.title {
            put("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

async fn emit_changes(iface_ref: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let iface = iface_ref.get().await;
    let emitter = iface_ref.signal_emitter();
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    iface.can_play_changed(emitter).await?;
    iface.can_pause_changed(emitter).await?;
    iface.can_seek_changed(emitter).await?;
    iface.can_go_next_changed(emitter).await?;
    iface.can_go_previous_changed(emitter).await?;
    Ok(())
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify_rx: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let iface_ref = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    log::info!("mpris: registered as {BUS_NAME}");

    loop {
        Timer::after(Duration::from_millis(100)).await;

        let mut dirty = false;
        loop {
            match notify_rx.try_recv() {
                Ok(()) => dirty = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // Controller dropped: the player is shutting down.
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if dirty {
            if let Err(e) = emit_changes(&iface_ref).await {
                log::warn!("mpris: failed to emit property changes: {e}");
            }
        }
    }
}

/// Start the D-Bus service on its own thread.
///
/// Bus failures are logged and leave the player fully usable without MPRIS.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".to_string())
        .spawn(move || {
            if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
                log::warn!("mpris: service unavailable: {e}");
            }
        });
    if let Err(e) = spawned {
        log::warn!("mpris: failed to start thread: {e}");
    }

    MprisHandle {
        state,
        notify: notify_tx,
        tracks: Vec::new(),
    }
}
