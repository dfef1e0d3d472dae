use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::cli::Args;
use crate::controller::PlaybackController;
use crate::engine::RodioEngine;
use crate::logging;
use crate::media_info::LoftyResolver;
use crate::mpris::ControlCmd;

mod event_loop;
mod settings;
mod startup;


pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings(args.config.as_deref());

    if args.dump_config {
        if let Some(w) = &settings_warning {
            eprintln!("mediadeck: {w}");
        }
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    match logging::init(&settings.logging, args.log_file.as_deref(), args.verbose) {
        Ok(path) => log::info!(
            "mediadeck {} starting, logging to {}",
            env!("CARGO_PKG_VERSION"),
            path.display()
        ),
        Err(e) => eprintln!("mediadeck: logging disabled: {e}"),
    }
    if let Some(w) = settings_warning {
        log::warn!("{w}");
    }

    let (engine, reports) = RodioEngine::spawn(&settings.audio)?;
    let mut controller = PlaybackController::new(engine, settings.audio.initial_volume);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    if args.no_mpris {
        log::info!("mpris disabled");
    } else {
        controller.subscribe(Box::new(crate::mpris::spawn_mpris(control_tx.clone())));
    }

    let resolver = LoftyResolver;
    let mut app = App::new(
        settings.ui.header_text.clone(),
        settings.ui.follow_playback,
        settings.ui.show_volume_panel,
    );
    if let Err(e) = startup::apply_cli_paths(
        &mut controller,
        &args.paths,
        args.autoplay,
        &settings.library,
        &resolver,
    ) {
        log::warn!("autoplay failed: {e}");
        app.set_notice(format!("autoplay: {e}"));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &resolver,
        &reports,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if run_result.is_err() {
        controller.shutdown(Duration::ZERO);
    }
    drop(control_tx);
    log::info!("bye");
    run_result
}
