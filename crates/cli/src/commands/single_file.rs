// `rulebridge single-file`: aggregate always-on rules into instruction files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;

use crate::config::Config;
use crate::output::OutputFormat;
use crate::sync::{self, SingleFileReport};

#[derive(Debug, Args)]
pub struct SingleFileArgs {
    /// Directory receiving the generated files.
    pub project: PathBuf,

    /// Only build these targets (by file name). Defaults to all configured.
    #[arg(long = "target")]
    pub targets: Vec<String>,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SingleFileArgs, root: &Path) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    super::finish(format, execute(&args, root), format_human, |_| Ok(()))
}

fn execute(args: &SingleFileArgs, root: &Path) -> anyhow::Result<SingleFileReport> {
    let config = Config::load(root).context("failed to load configuration")?;
    let targets = config.targets(&args.targets);
    if targets.is_empty() {
        bail!("no configured single-file target matches {}", args.targets.join(", "));
    }
    sync::single_file(root, &args.project, &targets, &config)
}

pub(crate) fn format_human(report: &SingleFileReport) -> String {
    if report.files.is_empty() {
        return "No single-file outputs written.".into();
    }
    report
        .files
        .iter()
        .map(|file| format!("{}: {}", file.disposition.as_str(), file.path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
