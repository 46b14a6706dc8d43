// rulebridge CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod exit_code;
mod lint;
mod output;
mod sync;

use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "rulebridge", about = "Sync canonical rule documents with editor rule files")]
struct Cli {
    /// Template root holding the canonical rules.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match commands::run(cli.command, &cli.root) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => ExitCode::from_error(&error).into(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
