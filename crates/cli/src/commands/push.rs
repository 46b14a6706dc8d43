// `rulebridge push`: canonical rules into a project's editor rules.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rulebridge_common::editor::Editor;
use serde::Serialize;

use crate::config::Config;
use crate::exit_code::ValidationFailed;
use crate::output::OutputFormat;
use crate::sync::{self, Policy, SyncReport};

#[derive(Debug, Args)]
pub struct PushArgs {
    /// Project directory receiving the editor rules.
    pub project: PathBuf,

    /// Target editor: cursor or windsurf.
    #[arg(long)]
    pub editor: String,

    /// Overwrite files that differ.
    #[arg(long)]
    pub force: bool,

    /// Report files that differ instead of skipping them silently.
    #[arg(long)]
    pub compare: bool,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct EditorReport {
    pub editor: Editor,
    #[serde(flatten)]
    pub report: SyncReport,
}

pub fn run(args: PushArgs, root: &Path) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    super::finish(format, execute(&args, root), format_human, check_failures)
}

fn execute(args: &PushArgs, root: &Path) -> anyhow::Result<EditorReport> {
    let editor: Editor = args.editor.parse()?;
    let config = Config::load(root).context("failed to load configuration")?;
    let policy = Policy { force: args.force, compare: args.compare };
    let report = sync::push(root, &args.project, editor, policy, &config)?;
    Ok(EditorReport { editor, report })
}

pub(crate) fn check_failures(result: &EditorReport) -> anyhow::Result<()> {
    match result.report.failures.len() {
        0 => Ok(()),
        count => Err(ValidationFailed { count }.into()),
    }
}

pub(crate) fn format_human(result: &EditorReport) -> String {
    super::format_sync_report(result.editor.as_str(), &result.report)
}
