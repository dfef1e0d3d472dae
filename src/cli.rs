use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "mediadeck")]
#[command(about = "Terminal media player with a looping playlist", long_about = None)]
pub struct Args {
    /// Media files or directories to queue at startup
    pub paths: Vec<PathBuf>,

    /// Config file (overrides MEDIADECK_CONFIG_PATH and the XDG default)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Log file (overrides logging.file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Don't register on the session bus
    #[arg(long)]
    pub no_mpris: bool,

    /// Start playing the first queued item right away
    #[arg(short = 'a', long)]
    pub autoplay: bool,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub dump_config: bool,
}
