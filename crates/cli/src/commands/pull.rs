// `rulebridge pull`: a project's editor rules back into canonical form.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rulebridge_common::editor::Editor;

use super::push::{check_failures, format_human, EditorReport};
use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::sync::{self, Policy, SyncReport};

#[derive(Debug, Args)]
pub struct PullArgs {
    /// Project directory holding the editor rules.
    pub project: PathBuf,

    /// Source editor: cursor or windsurf.
    #[arg(long)]
    pub editor: String,

    /// Overwrite canonical files that differ and import new editor files.
    #[arg(long)]
    pub force: bool,

    /// Report canonical files that differ.
    #[arg(long)]
    pub compare: bool,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PullArgs, root: &Path) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = execute(&args, root);
    if let Ok(result) = &result {
        for (code, message) in pending_warnings(&result.report) {
            output::print_warning(format, code, &message);
        }
    }
    super::finish(format, result, format_human, check_failures)
}

/// Editor files the pull could not account for.
fn pending_warnings(report: &SyncReport) -> Vec<(&'static str, String)> {
    let missing = report
        .missing
        .iter()
        .map(|path| ("MISSING_EDITOR_FILE", format!("no editor file at {}", path.display())));
    let new_files = report.new_files.iter().map(|path| {
        ("NEW_EDITOR_FILE", format!("{} has no canonical rule; pass --force to import it", path.display()))
    });
    missing.chain(new_files).collect()
}

fn execute(args: &PullArgs, root: &Path) -> anyhow::Result<EditorReport> {
    let editor: Editor = args.editor.parse()?;
    let config = Config::load(root).context("failed to load configuration")?;
    let policy = Policy { force: args.force, compare: args.compare };
    let report = sync::pull(root, &args.project, editor, policy, &config)?;
    Ok(EditorReport { editor, report })
}
