use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PromptKind};
use crate::config;
use crate::controller::PlaybackController;
use crate::engine::{EngineReport, MediaEngine};
use crate::error::PlayerError;
use crate::media_info::MediaInfoResolver;
use crate::mpris::ControlCmd;
use crate::ui;

use super::startup::{add_paths, expand_user_path, open_paths};

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Set once the engine's report channel has closed.
    pub engine_lost: bool,
}

/// Main terminal event loop: feeds engine reports, remote commands and key
/// presses into the controller one at a time and redraws in between.
/// Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<E: MediaEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
    resolver: &dyn MediaInfoResolver,
    reports: &Receiver<EngineReport>,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        drain_engine_reports(app, controller, reports, state);

        app.clamp_selection(controller.playlist().len());
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                controller.session(),
                controller.current_track(),
                controller.playlist().tracks(),
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, controller) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, resolver) {
                    return Ok(());
                }
            }
        }
    }
}

pub(super) fn drain_engine_reports<E: MediaEngine>(
    app: &mut App,
    controller: &mut PlaybackController<E>,
    reports: &Receiver<EngineReport>,
    state: &mut EventLoopState,
) {
    loop {
        match reports.try_recv() {
            Ok(report) => {
                if let Err(e) = controller.handle_engine_report(report) {
                    report_error(app, "playback", e);
                }
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if !state.engine_lost {
                    state.engine_lost = true;
                    log::error!("engine report channel closed");
                    app.set_notice("audio engine stopped unexpectedly");
                }
                break;
            }
        }
    }
    app.follow(controller.session().current_index);
}

fn report_error(app: &mut App, what: &str, e: PlayerError) {
    log::warn!("{what}: {e}");
    app.set_notice(format!("{what}: {e}"));
}

/// Apply one remote or key-derived command. Returns true on quit.
pub(super) fn handle_control_cmd<E: MediaEngine>(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
) -> bool {
    let result = match cmd {
        ControlCmd::Quit => {
            controller.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        ControlCmd::Play => {
            if controller.session().is_playing() {
                Ok(())
            } else if controller.session().has_track() {
                controller.toggle_play()
            } else {
                controller.select_and_play(None)
            }
        }
        ControlCmd::Pause => {
            if controller.session().is_playing() {
                controller.toggle_play()
            } else {
                Ok(())
            }
        }
        ControlCmd::PlayPause => controller.toggle_play(),
        ControlCmd::Stop => {
            controller.stop();
            Ok(())
        }
        ControlCmd::Next => controller.advance_to_next(),
        ControlCmd::Prev => controller.advance_to_previous(),
        ControlCmd::SeekBy(ms) => controller.seek_by(ms),
        ControlCmd::SetPosition(p) => controller.seek_to(p),
    };

    if let Err(e) = result {
        report_error(app, "control", e);
    }
    app.follow(controller.session().current_index);
    false
}

/// Keys that map one-to-one onto a transport command.
pub(super) fn key_command(key: KeyEvent, settings: &config::Settings) -> Option<ControlCmd> {
    let step = i64::try_from(settings.controls.seek_step_ms).unwrap_or(i64::MAX);
    match key.code {
        KeyCode::Char('q') => Some(ControlCmd::Quit),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(ControlCmd::PlayPause),
        KeyCode::Char('s') => Some(ControlCmd::Stop),
        KeyCode::Char('n') => Some(ControlCmd::Next),
        KeyCode::Char('N') => Some(ControlCmd::Prev),
        KeyCode::Char('l') | KeyCode::Right => Some(ControlCmd::SeekBy(step)),
        KeyCode::Char('h') | KeyCode::Left => Some(ControlCmd::SeekBy(-step)),
        _ => None,
    }
}

/// Handle one key press. Returns true on quit.
pub(super) fn handle_key_event<E: MediaEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
    resolver: &dyn MediaInfoResolver,
) -> bool {
    if app.is_prompting() {
        handle_prompt_key(key, settings, app, controller, resolver);
        return false;
    }

    app.clear_notice();
    if key.code != KeyCode::Char('g') {
        app.clear_pending_g();
    }

    if let Some(cmd) = key_command(key, settings) {
        return handle_control_cmd(cmd, settings, app, controller);
    }

    let len = controller.playlist().len();
    let step = i32::from(settings.audio.volume_step);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback = false;
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback = false;
            app.prev(len);
        }
        KeyCode::Char('g') => {
            if app.press_g() {
                app.follow_playback = false;
                app.jump_top();
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback = false;
            app.jump_bottom(len);
        }
        KeyCode::Char('f') => {
            app.toggle_follow_playback();
            app.follow(controller.session().current_index);
        }
        KeyCode::Enter => {
            if len > 0 {
                app.follow_playback = true;
                if let Err(e) = controller.select_and_play(Some(app.selected)) {
                    report_error(app, "play", e);
                }
            }
        }
        KeyCode::Char('r') => {
            app.follow_playback = true;
            if let Err(e) = controller.select_and_play(None) {
                report_error(app, "run", e);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if len > 0 {
                match controller.remove(app.selected) {
                    Ok(track) => app.set_notice(format!("removed {}", track.file_name())),
                    Err(e) => report_error(app, "remove", e),
                }
                app.clamp_selection(controller.playlist().len());
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => controller.nudge_volume(step),
        KeyCode::Char('-') => controller.nudge_volume(-step),
        KeyCode::Char('m') => {
            let fallback = settings.audio.initial_volume.max(settings.audio.volume_step);
            let target = app.mute_target(controller.session().volume, fallback);
            controller.set_volume(i32::from(target));
        }
        KeyCode::Char('v') => app.toggle_volume_panel(),
        KeyCode::Char('o') => app.open_prompt(PromptKind::Open),
        KeyCode::Char('a') => app.open_prompt(PromptKind::Add),
        _ => {}
    }

    app.follow(controller.session().current_index);
    false
}

fn handle_prompt_key<E: MediaEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
    resolver: &dyn MediaInfoResolver,
) {
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Backspace => app.pop_prompt_char(),
        KeyCode::Char(c) if !c.is_control() => app.push_prompt_char(c),
        KeyCode::Enter => {
            let Some((kind, input)) = app.take_prompt() else {
                return;
            };
            let paths = [expand_user_path(&input)];
            let count = match kind {
                PromptKind::Open => {
                    app.follow_playback = true;
                    open_paths(controller, &paths, &settings.library, resolver)
                }
                PromptKind::Add => add_paths(controller, &paths, &settings.library, resolver),
            };

            if count == 0 {
                log::warn!("no playable media at {input}");
                app.set_notice(format!("no playable media at {input}"));
            } else {
                app.set_notice(format!("{}: {count} item(s)", kind.label()));
            }
            app.follow(controller.session().current_index);
        }
        _ => {}
    }
}
