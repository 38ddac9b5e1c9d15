mod generate;
mod run;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use generate::{run_generate, GenerateArgs};
use run::{run_simulation, RunArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct CLIParser {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Run the multi-species simulation on a pool of worker threads
    Run(RunArgs),
    /// Write a random board to a file
    Generate(GenerateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CLIParser::parse();
    match args.action {
        Action::Run(args) => run_simulation(args),
        Action::Generate(args) => run_generate(args),
    }
}
