// `rulebridge generate`: every single-file target, then push for each editor.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rulebridge_common::editor::Editor;
use serde::Serialize;

use super::push::EditorReport;
use crate::config::Config;
use crate::exit_code::ValidationFailed;
use crate::output::OutputFormat;
use crate::sync::{self, Policy, SingleFileReport};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project directory receiving all generated outputs.
    pub project: PathBuf,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub single_file: SingleFileReport,
    pub editors: Vec<EditorReport>,
}

pub fn run(args: GenerateArgs, root: &Path) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    super::finish(format, execute(&args, root), format_human, check_failures)
}

fn execute(args: &GenerateArgs, root: &Path) -> anyhow::Result<GenerateReport> {
    let config = Config::load(root).context("failed to load configuration")?;
    let single_file = sync::single_file(root, &args.project, &config.targets(&[]), &config)?;

    let editors = Editor::ALL
        .into_iter()
        .map(|editor| -> anyhow::Result<EditorReport> {
            let report = sync::push(root, &args.project, editor, Policy::default(), &config)?;
            Ok(EditorReport { editor, report })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(GenerateReport { single_file, editors })
}

fn check_failures(result: &GenerateReport) -> anyhow::Result<()> {
    let count: usize = result.editors.iter().map(|editor| editor.report.failures.len()).sum();
    match count {
        0 => Ok(()),
        count => Err(ValidationFailed { count }.into()),
    }
}

fn format_human(result: &GenerateReport) -> String {
    let mut sections = vec![super::single_file::format_human(&result.single_file)];
    sections.extend(
        result.editors.iter().map(|editor| super::format_sync_report(editor.editor.as_str(), &editor.report)),
    );
    sections.join("\n")
}
