//! UI rendering helpers for the terminal user interface.
//!
//! Everything here is drawn from the `App` view model, the controller's
//! `PlaybackSession` snapshot and the `TransportView` derived from it.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, InputMode};
use crate::config::ControlsSettings;
use crate::controller::{PlaybackSession, PlaybackState};
use crate::playlist::Track;
use crate::presenter::{PlayIcon, TransportView, VolumeIcon};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("r", "run playlist");
    map.insert("space/p", "play/pause");
    map.insert("s", "stop");
    map.insert("n/N", "next/prev");
    map.insert("o/a", "open/add");
    map.insert("d", "remove");
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("v", "volume panel");
    map.insert("f", "follow");
    map.insert("q", "quit");
    // h/l is filled dynamically from config.
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_ms: u64) -> String {
    let order = [
        "j/k", "gg/G", "enter", "r", "space/p", "s", "h/l", "n/N", "o/a", "d", "+/-", "m", "v",
        "f", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}", format_step(seek_step_ms)))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn format_step(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{}ms", ms)
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / total`, with `--:--` while the total is unknown.
fn time_text(position: Duration, duration: Duration) -> String {
    let total = if duration.is_zero() {
        "--:--".to_string()
    } else {
        format_mmss(duration)
    };
    format!("{} / {}", format_mmss(position), total)
}

fn state_text(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    }
}

/// Name shown for the active item: tags when present, else the file name.
fn now_playing_text(track: &Track) -> String {
    match (track.artist.as_deref(), track.title.as_deref()) {
        (Some(a), Some(t)) => format!("{a} - {t}"),
        (None, Some(t)) => t.to_string(),
        _ => track.file_name(),
    }
}

/// Visible `[start, end)` window of `total` rows that keeps `selected`
/// centered when possible.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    session: &PlaybackSession,
    current: Option<&Track>,
    tracks: &[Track],
    controls: &ControlsSettings,
) {
    let view = TransportView::from_session(session, tracks.len());

    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(1),
        Constraint::Length(3),
    ];
    if app.show_volume_panel {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(4));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    // Header
    let header = Paragraph::new(app.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" mediadeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_status(frame, chunks[1], app, session, current, &view);
    draw_playlist(frame, chunks[2], app, session, tracks);

    // Position slider
    let time = time_text(session.position, session.duration);
    let gauge_title = if view.seek_enabled {
        " position "
    } else {
        " position (idle) "
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(gauge_title))
        .ratio(view.progress_ratio())
        .label(time);
    frame.render_widget(gauge, chunks[3]);

    let mut next = 4;
    if app.show_volume_panel {
        let icon = match view.volume_icon {
            VolumeIcon::Normal => "vol",
            VolumeIcon::Muted => "muted",
        };
        let volume = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" volume "))
            .percent(u16::from(view.volume))
            .label(format!("{icon} {}%", view.volume));
        frame.render_widget(volume, chunks[next]);
        next += 1;
    }

    // Footer: prompt when typing, otherwise the key help.
    let footer = match &app.mode {
        InputMode::Prompt { kind, input } => Paragraph::new(format!("{}: {}_", kind.label(), input))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" enter path (esc cancels) "),
            ),
        InputMode::Normal => Paragraph::new(controls_text(controls.seek_step_ms))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" controls ")
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    }),
            )
            .wrap(Wrap { trim: true }),
    };
    frame.render_widget(footer, chunks[next]);
}

/// One span per transport control, dimmed while the control is unavailable.
fn transport_spans(view: &TransportView) -> Vec<Span<'static>> {
    let play = match view.play_icon {
        PlayIcon::Play => "[▶ play]",
        PlayIcon::Pause => "[⏸ pause]",
    };
    let controls = [
        (play, view.play_enabled),
        ("[■ stop]", view.stop_enabled),
        ("[« » seek]", view.seek_enabled),
        ("[run]", view.run_enabled),
        ("[remove]", view.remove_enabled),
    ];
    let mut spans = Vec::new();
    for (label, enabled) in controls {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        if enabled {
            spans.push(Span::raw(label).bold());
        } else {
            spans.push(Span::raw(label).dim());
        }
    }
    spans
}

fn draw_status(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    session: &PlaybackSession,
    current: Option<&Track>,
    view: &TransportView,
) {
    let mut parts: Vec<String> = Vec::new();

    parts.push(state_text(session.state).to_string());

    match current {
        Some(track) => parts.push(format!("Now: {}", now_playing_text(track))),
        None if view.run_enabled => parts.push("Press r to run the playlist".to_string()),
        None => parts.push("Playlist empty: press o or a to add media".to_string()),
    }

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    let mut line = vec![Span::raw(parts.join(" • "))];
    if let Some(notice) = &app.notice {
        line.push(Span::raw(" • "));
        line.push(Span::raw(notice.as_str()).bold());
    }

    let status = Paragraph::new(vec![Line::from(transport_spans(view)), Line::from(line)])
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_playlist(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    session: &PlaybackSession,
    tracks: &[Track],
) {
    // Only build ListItems for the visible window.
    let total = tracks.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(total, height, app.selected);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let index = start + offset;
            if session.current_index == Some(index) {
                ListItem::new(format!("♪ {}", track.label)).bold()
            } else {
                ListItem::new(format!("  {}", track.label))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" playlist ({total}) ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(app.selected.min(total - 1) - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
