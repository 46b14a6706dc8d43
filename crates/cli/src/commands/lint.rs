// `rulebridge lint`: report broken markdown links in the template.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use crate::config::Config;
use crate::exit_code::BrokenLinks;
use crate::lint::{self, LintReport};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct LintArgs {
    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: LintArgs, root: &Path) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = Config::load(root)
        .context("failed to load configuration")
        .and_then(|config| lint::lint(root, &config));
    super::finish(format, result, format_human, check_broken)
}

fn check_broken(report: &LintReport) -> anyhow::Result<()> {
    match report.broken.len() {
        0 => Ok(()),
        count => Err(BrokenLinks { count }.into()),
    }
}

fn format_human(report: &LintReport) -> String {
    let mut lines: Vec<String> = report.broken.iter().map(|link| link.render()).collect();
    if report.broken.is_empty() {
        lines.push(format!(
            "All markdown links are valid ({} links in {} files).",
            report.links_checked, report.files_checked
        ));
    } else {
        lines.push(format!("{} broken link(s) in {} files.", report.broken.len(), report.files_checked));
    }
    lines.join("\n")
}
