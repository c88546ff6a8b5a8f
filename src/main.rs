mod cli;
mod commands;
mod settings;

use crate::cli::Cli;
use crate::settings::Settings;
use challonge_api::Challonge;
use clap::Parser;
use env_logger::Env;
use log::debug;
use std::io;

fn main() -> anyhow::Result<()> {
    better_panic::install();

    let args = Cli::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", level));

    let settings = Settings::load(args.config.as_deref())?;
    debug!("settings: {settings:?}");
    let challonge = Challonge::with_config(settings.into_client_config()?);

    let mut stdout = io::stdout().lock();
    commands::run(&challonge, args.command, &mut stdout)
}
