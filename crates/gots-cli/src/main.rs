mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let result = match cli.command {
        Command::Generate(args) => commands::generate::run(args),
        Command::Render(args) => commands::render::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
