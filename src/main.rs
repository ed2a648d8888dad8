use anyhow::Result;
use clap::Parser;
use rms::cli::Cli;
use rms::logging;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level());
    log::info!("rms starting with {} resource(s)", cli.resources.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli.run(&mut out)
}
