use super::*;
use crate::engine::testing::FakeEngine;
use crate::engine::{EngineEvent, EngineReport, EngineState, LoadToken};
use crate::error::PlayerError;
use crate::media_info::MediaInfo;
use crate::playlist::Track;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn t(name: &str, secs: u64) -> Track {
    Track::new(
        format!("/media/{name}"),
        MediaInfo {
            duration: Some(Duration::from_secs(secs)),
            ..MediaInfo::default()
        },
    )
}

fn controller() -> PlaybackController<FakeEngine> {
    PlaybackController::new(FakeEngine::default(), 50)
}

/// Controller with `names` appended and the engine log cleared.
fn with_playlist(names: &[&str]) -> PlaybackController<FakeEngine> {
    let mut c = controller();
    for n in names {
        c.add_to_playlist(t(n, 10));
    }
    c.engine_mut().clear();
    c
}

#[derive(Default)]
struct Counts {
    session: usize,
    playlist: usize,
    last_len: usize,
    last_index: Option<usize>,
}

struct Recorder(Rc<RefCell<Counts>>);

impl PlayerObserver for Recorder {
    fn on_session_changed(&mut self, session: &PlaybackSession) {
        let mut c = self.0.borrow_mut();
        c.session += 1;
        c.last_index = session.current_index;
    }

    fn on_playlist_changed(&mut self, tracks: &[Track]) {
        let mut c = self.0.borrow_mut();
        c.playlist += 1;
        c.last_len = tracks.len();
    }
}

fn report(c: &PlaybackController<FakeEngine>, event: EngineEvent) -> EngineReport {
    EngineReport {
        token: c.engine().last_token().unwrap(),
        event,
    }
}

#[test]
fn new_session_starts_stopped_with_nothing_active() {
    let c = controller();
    let s = c.session();
    assert_eq!(s.current_index, None);
    assert_eq!(s.state, PlaybackState::Stopped);
    assert_eq!(s.volume, 50);
    assert!(!s.muted);
    assert_eq!(c.engine().commands(), vec!["volume 0.50"]);
}

#[test]
fn open_new_replaces_playlist_and_plays() {
    let mut c = with_playlist(&["a.mp3", "b.mp3"]);
    c.open_new(t("c.mkv", 30));

    assert_eq!(c.playlist().len(), 1);
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.session().state, PlaybackState::Playing);
    assert_eq!(c.session().duration, Duration::from_secs(30));
    assert_eq!(c.engine().commands(), vec!["load /media/c.mkv", "play"]);
}

#[test]
fn add_to_playlist_never_autoplays() {
    let mut c = controller();
    c.engine_mut().clear();
    assert_eq!(c.add_to_playlist(t("a.mp3", 1)), 0);
    assert_eq!(c.add_to_playlist(t("b.mp3", 1)), 1);

    assert_eq!(c.session().current_index, None);
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert!(c.engine().commands().is_empty());
}

#[test]
fn toggle_without_track_is_reported_noop_every_time() {
    let mut c = with_playlist(&[]);
    for _ in 0..2 {
        assert!(matches!(c.toggle_play(), Err(PlayerError::NoActiveTrack)));
        assert_eq!(c.session().state, PlaybackState::Stopped);
        assert_eq!(c.session().current_index, None);
    }
    assert!(c.engine().commands().is_empty());
}

#[test]
fn toggle_cycles_between_playing_and_paused() {
    let mut c = with_playlist(&["a.mp3"]);
    c.select_and_play(None).unwrap();
    c.engine_mut().clear();

    c.toggle_play().unwrap();
    assert_eq!(c.session().state, PlaybackState::Paused);
    c.toggle_play().unwrap();
    assert_eq!(c.session().state, PlaybackState::Playing);
    assert_eq!(c.engine().commands(), vec!["pause", "play"]);
}

#[test]
fn stop_keeps_index_and_rewinds() {
    let mut c = with_playlist(&["a.mp3", "b.mp3"]);
    c.select_and_play(Some(1)).unwrap();
    c.on_position(Duration::from_secs(4));
    c.engine_mut().clear();

    c.stop();
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().position, Duration::ZERO);

    c.toggle_play().unwrap();
    assert_eq!(c.session().state, PlaybackState::Playing);
    assert_eq!(c.engine().commands(), vec!["stop", "play"]);
}

#[test]
fn seek_clamps_to_zero_and_duration() {
    let mut c = with_playlist(&["a.mp3"]);
    c.select_and_play(None).unwrap();
    c.on_position(Duration::from_secs(3));
    c.engine_mut().clear();

    c.seek_by(-5_000).unwrap();
    assert_eq!(c.session().position, Duration::ZERO);

    c.seek_by(5_000).unwrap();
    assert_eq!(c.session().position, Duration::from_secs(5));

    c.seek_by(i64::MAX).unwrap();
    assert_eq!(c.session().position, Duration::from_secs(10));

    assert_eq!(c.engine().commands(), vec!["seek 0", "seek 5000", "seek 10000"]);
    assert_eq!(c.session().state, PlaybackState::Playing);
}

#[test]
fn seek_applies_while_paused_without_state_change() {
    let mut c = with_playlist(&["a.mp3"]);
    c.select_and_play(None).unwrap();
    c.toggle_play().unwrap();

    c.seek_to(Duration::from_secs(7)).unwrap();
    assert_eq!(c.session().position, Duration::from_secs(7));
    assert_eq!(c.session().state, PlaybackState::Paused);
}

#[test]
fn seek_without_track_is_reported_and_sends_nothing() {
    let mut c = with_playlist(&["a.mp3"]);
    assert!(matches!(c.seek_by(1_000), Err(PlayerError::NoActiveTrack)));
    assert!(matches!(
        c.seek_to(Duration::from_secs(1)),
        Err(PlayerError::NoActiveTrack)
    ));
    assert!(c.engine().commands().is_empty());
}

#[test]
fn select_and_play_validates_index() {
    let mut c = with_playlist(&["a.mp3"]);
    assert!(matches!(
        c.select_and_play(Some(3)),
        Err(PlayerError::IndexOutOfRange { index: 3, len: 1 })
    ));
    assert_eq!(c.session().current_index, None);
    assert!(c.engine().commands().is_empty());
}

#[test]
fn select_and_play_defaults_to_first_or_noop_when_empty() {
    let mut empty = with_playlist(&[]);
    empty.select_and_play(None).unwrap();
    assert_eq!(empty.session().current_index, None);
    assert!(empty.engine().commands().is_empty());

    let mut c = with_playlist(&["a.mp3", "b.mp3"]);
    c.select_and_play(None).unwrap();
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.engine().commands(), vec!["load /media/a.mp3", "play"]);
}

#[test]
fn end_of_media_advances_to_next_item() {
    let mut c = controller();
    c.add_to_playlist(t("A", 10));
    c.add_to_playlist(t("B", 20));
    c.select_and_play(Some(0)).unwrap();
    c.engine_mut().clear();

    c.on_end_of_media().unwrap();

    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().state, PlaybackState::Playing);
    assert_eq!(c.session().duration, Duration::from_secs(20));
    assert_eq!(c.engine().commands(), vec!["load /media/B", "play"]);
}

#[test]
fn advance_wraps_from_last_to_first() {
    let mut c = with_playlist(&["a", "b", "c"]);
    c.select_and_play(Some(2)).unwrap();
    c.advance_to_next().unwrap();
    assert_eq!(c.session().current_index, Some(0));
}

#[test]
fn advance_on_single_item_replays_it() {
    let mut c = with_playlist(&["a"]);
    c.select_and_play(Some(0)).unwrap();
    c.engine_mut().clear();
    c.advance_to_next().unwrap();
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.engine().commands(), vec!["load /media/a", "play"]);
}

#[test]
fn advance_on_empty_playlist_goes_idle() {
    let mut c = with_playlist(&[]);
    c.advance_to_next().unwrap();
    assert_eq!(c.session().current_index, None);
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert!(c.engine().commands().is_empty());
}

#[test]
fn previous_wraps_from_first_to_last() {
    let mut c = with_playlist(&["a", "b", "c"]);
    c.select_and_play(Some(0)).unwrap();
    c.advance_to_previous().unwrap();
    assert_eq!(c.session().current_index, Some(2));
    c.advance_to_previous().unwrap();
    assert_eq!(c.session().current_index, Some(1));
}

#[test]
fn removing_only_active_item_stops_and_goes_idle() {
    let mut c = with_playlist(&["A"]);
    c.select_and_play(Some(0)).unwrap();
    c.engine_mut().clear();

    let removed = c.remove(0).unwrap();
    assert_eq!(removed.file_name(), "A");
    assert!(c.playlist().is_empty());
    assert_eq!(c.session().current_index, None);
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert_eq!(c.engine().commands(), vec!["stop"]);
}

#[test]
fn removing_active_item_stops_before_playing_successor() {
    let mut c = with_playlist(&["a", "b", "c"]);
    c.select_and_play(Some(1)).unwrap();
    c.engine_mut().clear();

    c.remove(1).unwrap();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.current_track().unwrap().file_name(), "c");
    assert_eq!(c.engine().commands(), vec!["stop", "load /media/c", "play"]);
}

#[test]
fn removing_active_last_item_wraps_to_first() {
    let mut c = with_playlist(&["a", "b", "c"]);
    c.select_and_play(Some(2)).unwrap();
    c.remove(2).unwrap();
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.current_track().unwrap().file_name(), "a");
}

#[test]
fn removing_other_items_reconciles_current_index() {
    let mut c = with_playlist(&["a", "b", "c", "d"]);
    c.select_and_play(Some(2)).unwrap();
    c.engine_mut().clear();

    c.remove(0).unwrap();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.current_track().unwrap().file_name(), "c");

    c.remove(2).unwrap();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.current_track().unwrap().file_name(), "c");

    assert_eq!(c.session().state, PlaybackState::Playing);
    assert!(c.engine().commands().is_empty());
}

#[test]
fn removing_out_of_range_index_fails_without_side_effects() {
    let mut c = with_playlist(&["a"]);
    c.select_and_play(Some(0)).unwrap();
    c.engine_mut().clear();

    assert!(matches!(
        c.remove(4),
        Err(PlayerError::IndexOutOfRange { index: 4, len: 1 })
    ));
    assert_eq!(c.playlist().len(), 1);
    assert_eq!(c.session().current_index, Some(0));
    assert!(c.engine().commands().is_empty());
}

#[test]
fn volume_is_clamped_and_drives_muted_flag() {
    let mut c = controller();
    c.set_volume(0);
    assert!(c.session().muted);
    c.set_volume(1);
    assert!(!c.session().muted);
    assert_eq!(c.session().volume, 1);

    c.set_volume(250);
    assert_eq!(c.session().volume, 100);
    c.set_volume(-3);
    assert_eq!(c.session().volume, 0);
    assert!(c.session().muted);

    c.nudge_volume(5);
    assert_eq!(c.session().volume, 5);
    assert_eq!(c.session().state, PlaybackState::Stopped);
}

#[test]
fn position_and_duration_reports_are_copied() {
    let mut c = with_playlist(&["a"]);
    c.select_and_play(None).unwrap();

    c.on_duration(Duration::from_secs(12));
    c.on_position(Duration::from_secs(3));
    assert_eq!(c.session().duration_ms(), 12_000);
    assert_eq!(c.session().position_ms(), 3_000);

    c.on_position(Duration::from_secs(30));
    assert_eq!(c.session().position, Duration::from_secs(12));
    assert_eq!(c.session().state, PlaybackState::Playing);
}

#[test]
fn engine_reports_for_replaced_media_are_dropped() {
    let mut c = with_playlist(&["a", "b"]);
    c.select_and_play(Some(0)).unwrap();
    let old = c.engine().last_token().unwrap();
    c.select_and_play(Some(1)).unwrap();

    c.handle_engine_report(EngineReport {
        token: old,
        event: EngineEvent::EndOfMedia,
    })
    .unwrap();
    assert_eq!(c.session().current_index, Some(1));

    c.handle_engine_report(EngineReport {
        token: old,
        event: EngineEvent::PositionChanged(Duration::from_secs(9)),
    })
    .unwrap();
    assert_eq!(c.session().position, Duration::ZERO);
}

#[test]
fn engine_reports_drive_the_session() {
    let mut c = with_playlist(&["a", "b"]);
    c.select_and_play(Some(0)).unwrap();

    let r = report(&c, EngineEvent::Loaded {
        duration: Some(Duration::from_secs(42)),
    });
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().duration, Duration::from_secs(42));

    let r = report(&c, EngineEvent::StateChanged(EngineState::Paused));
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().state, PlaybackState::Paused);

    let r = report(&c, EngineEvent::StateChanged(EngineState::Playing));
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().state, PlaybackState::Playing);

    let r = report(&c, EngineEvent::EndOfMedia);
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().current_index, Some(1));
    assert_eq!(c.session().state, PlaybackState::Playing);
}

#[test]
fn end_of_media_after_stop_or_pause_is_ignored() {
    let mut c = with_playlist(&["a", "b"]);
    c.select_and_play(Some(0)).unwrap();
    c.stop();
    c.engine_mut().clear();

    let r = report(&c, EngineEvent::EndOfMedia);
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert!(c.engine().commands().is_empty());

    c.toggle_play().unwrap();
    c.toggle_play().unwrap();
    let r = report(&c, EngineEvent::EndOfMedia);
    c.handle_engine_report(r).unwrap();
    assert_eq!(c.session().current_index, Some(0));
    assert_eq!(c.session().state, PlaybackState::Paused);
}

#[test]
fn load_failure_is_surfaced_and_retried_on_toggle() {
    let mut c = with_playlist(&["a"]);
    c.select_and_play(Some(0)).unwrap();

    let r = report(&c, EngineEvent::LoadFailed("bad file".into()));
    assert!(matches!(
        c.handle_engine_report(r),
        Err(PlayerError::Engine(msg)) if msg == "bad file"
    ));
    assert_eq!(c.session().state, PlaybackState::Stopped);
    assert_eq!(c.session().current_index, Some(0));

    c.engine_mut().clear();
    c.toggle_play().unwrap();
    assert_eq!(c.engine().commands(), vec!["load /media/a", "play"]);
    assert_ne!(c.engine().last_token(), Some(LoadToken::default()));
}

#[test]
fn observers_are_notified_after_state_changes() {
    let counts = Rc::new(RefCell::new(Counts::default()));
    let mut c = controller();
    c.subscribe(Box::new(Recorder(counts.clone())));
    assert_eq!(counts.borrow().session, 1);
    assert_eq!(counts.borrow().playlist, 1);

    c.add_to_playlist(t("a", 1));
    c.add_to_playlist(t("b", 1));
    assert_eq!(counts.borrow().playlist, 3);
    assert_eq!(counts.borrow().last_len, 2);

    c.select_and_play(Some(1)).unwrap();
    assert_eq!(counts.borrow().last_index, Some(1));

    let before = counts.borrow().session;
    c.set_volume(10);
    c.on_position(Duration::from_millis(200));
    assert_eq!(counts.borrow().session, before + 2);

    c.remove(1).unwrap();
    assert_eq!(counts.borrow().last_len, 1);
    assert_eq!(counts.borrow().last_index, Some(0));
}

#[test]
fn shutdown_releases_the_engine() {
    let mut c = with_playlist(&["a"]);
    c.select_and_play(None).unwrap();
    c.shutdown(Duration::ZERO);
    assert_eq!(c.engine().commands().last().unwrap(), "shutdown");
    assert_eq!(c.session().state, PlaybackState::Stopped);
}
