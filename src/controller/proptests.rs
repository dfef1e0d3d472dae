//! Property-based tests for the playback controller.

use super::*;
use crate::engine::testing::FakeEngine;
use crate::media_info::MediaInfo;
use crate::playlist::Track;
use proptest::prelude::*;
use std::time::Duration;

fn track(i: usize, secs: u64) -> Track {
    Track::new(
        format!("/media/{i}.mp3"),
        MediaInfo {
            duration: Some(Duration::from_secs(secs)),
            ..MediaInfo::default()
        },
    )
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(usize),
    Play(usize),
    Next,
    Stop,
    Toggle,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => (0usize..12).prop_map(Op::Remove),
        1 => (0usize..12).prop_map(Op::Play),
        1 => Just(Op::Next),
        1 => Just(Op::Stop),
        1 => Just(Op::Toggle),
    ]
}

proptest! {
    /// Property: length tracks appends minus successful removals and the
    /// active index always points inside the playlist.
    #[test]
    fn playlist_length_and_current_index_stay_consistent(
        ops in prop::collection::vec(op(), 1..60)
    ) {
        let mut c = PlaybackController::new(FakeEngine::default(), 50);
        let mut appended = 0usize;
        let mut removed = 0usize;

        for op in ops {
            match op {
                Op::Add => {
                    let idx = c.add_to_playlist(track(appended, 10));
                    prop_assert_eq!(idx, c.playlist().len() - 1);
                    appended += 1;
                }
                Op::Remove(i) => {
                    if c.remove(i).is_ok() {
                        removed += 1;
                    }
                }
                Op::Play(i) => {
                    let _ = c.select_and_play(Some(i));
                }
                Op::Next => c.advance_to_next().unwrap(),
                Op::Stop => c.stop(),
                Op::Toggle => {
                    let _ = c.toggle_play();
                }
            }

            prop_assert_eq!(c.playlist().len(), appended - removed);
            for i in 0..c.playlist().len() {
                prop_assert!(c.playlist().get(i).is_ok());
            }
            if let Some(i) = c.session().current_index {
                prop_assert!(i < c.playlist().len());
            }
        }
    }

    /// Property: advancing on a playlist of length N yields (current + 1) mod N.
    #[test]
    fn advance_is_successor_mod_len(len in 1usize..20, start in 0usize..20) {
        let start = start % len;
        let mut c = PlaybackController::new(FakeEngine::default(), 50);
        for i in 0..len {
            c.add_to_playlist(track(i, 5));
        }
        c.select_and_play(Some(start)).unwrap();
        c.advance_to_next().unwrap();
        prop_assert_eq!(c.session().current_index, Some((start + 1) % len));
    }

    /// Property: a seek always lands inside [0, duration].
    #[test]
    fn seek_result_is_clamped(
        secs in 0u64..600,
        start_ms in 0u64..600_000,
        delta in any::<i64>(),
    ) {
        let mut c = PlaybackController::new(FakeEngine::default(), 50);
        c.add_to_playlist(track(0, secs));
        c.select_and_play(None).unwrap();
        c.on_position(Duration::from_millis(start_ms));

        c.seek_by(delta).unwrap();
        let pos = c.session().position;
        prop_assert!(pos <= Duration::from_secs(secs));
    }

    /// Property: volume always ends up in 0..=100 and muted mirrors zero.
    #[test]
    fn volume_clamps_and_mirrors_mute(percent in any::<i32>()) {
        let mut c = PlaybackController::new(FakeEngine::default(), 50);
        c.set_volume(percent);
        prop_assert!(c.session().volume <= 100);
        prop_assert_eq!(c.session().muted, c.session().volume == 0);
    }
}
