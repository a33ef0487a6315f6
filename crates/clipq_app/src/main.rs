mod config;
mod console;
mod effects;
mod logging;
mod render;
mod session;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment and flags still apply.
    let _ = dotenvy::dotenv();

    let cli = config::Cli::parse();
    logging::initialize(cli.log, clipq_logging::parse_level(&cli.log_level));
    session::run(cli)
}
