use clap::Parser;

mod app;
mod cli;
mod config;
mod controller;
mod engine;
mod error;
mod logging;
mod media_info;
mod mpris;
mod playlist;
mod presenter;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run(cli::Args::parse())
}
