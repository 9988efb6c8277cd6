//! storyc
//!
//! Entry point for the story tooling. Parses CLI arguments, installs
//! logging and delegates to the StoryTool.

use clap::Parser as ClapParser;
use story_cli::{Cli, CliError, StoryTool};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = StoryTool::new().and_then(|tool| tool.run(&cli.command));
    match result {
        Ok(report) => println!("{}", report),
        Err(CliError::IoError(e)) => {
            eprintln!("Error: Could not access file: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
