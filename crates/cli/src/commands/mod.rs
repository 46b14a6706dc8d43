// CLI subcommand dispatch.

use std::path::Path;

use clap::Subcommand;

use crate::output::{self, OutputFormat};
use crate::sync::{Disposition, SyncReport};

pub mod generate;
pub mod lint;
pub mod pull;
pub mod push;
pub mod single_file;

#[derive(Subcommand)]
pub enum Command {
    /// Write canonical rules into a project's editor rules directory
    Push(push::PushArgs),
    /// Bring a project's editor rules back into canonical form
    Pull(pull::PullArgs),
    /// Fold always-on rules into single instruction files
    SingleFile(single_file::SingleFileArgs),
    /// Single-file outputs plus push for every editor
    Generate(generate::GenerateArgs),
    /// Check markdown links in rules and memory-bank
    Lint(lint::LintArgs),
}

pub fn run(cmd: Command, root: &Path) -> anyhow::Result<()> {
    match cmd {
        Command::Push(args) => push::run(args, root),
        Command::Pull(args) => pull::run(args, root),
        Command::SingleFile(args) => single_file::run(args, root),
        Command::Generate(args) => generate::run(args, root),
        Command::Lint(args) => lint::run(args, root),
    }
}

/// Print the report, then turn a failure into the command's error.
pub(crate) fn finish<T: serde::Serialize>(
    format: OutputFormat,
    result: anyhow::Result<T>,
    human_fn: impl FnOnce(&T) -> String,
    check: impl FnOnce(&T) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let outcome = result.and_then(|value| {
        output::print_output(format, &value, human_fn)?;
        check(&value)
    });
    if let Err(error) = &outcome {
        output::print_anyhow_error(format, error);
    }
    outcome
}

pub(crate) fn format_sync_report(label: &str, report: &SyncReport) -> String {
    let mut lines = vec![format!(
        "{label}: {} created, {} overwritten, {} identical, {} skipped, {} differ",
        report.count(Disposition::Created),
        report.count(Disposition::Overwritten),
        report.count(Disposition::Identical),
        report.count(Disposition::Skipped),
        report.count(Disposition::Differs),
    )];
    for file in &report.files {
        if file.disposition == Disposition::Differs {
            lines.push(format!("  differs: {}", file.path.display()));
        }
    }
    for failure in &report.failures {
        lines.push(format!("  failed: {}: {}", failure.path.display(), failure.error));
    }
    for path in &report.missing {
        lines.push(format!("  missing: {}", path.display()));
    }
    for path in &report.new_files {
        lines.push(format!("  new (use --force to import): {}", path.display()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{Failure, FileOutcome};
    use std::path::PathBuf;

    #[test]
    fn sync_summary_lists_problems() {
        let report = SyncReport {
            files: vec![
                FileOutcome { path: PathBuf::from("a.mdc"), disposition: Disposition::Created },
                FileOutcome { path: PathBuf::from("b.mdc"), disposition: Disposition::Differs },
            ],
            failures: vec![Failure { path: PathBuf::from("c.md"), error: "boom".into() }],
            missing: vec![PathBuf::from("d.mdc")],
            new_files: vec![PathBuf::from("e.mdc")],
        };
        let text = format_sync_report("cursor", &report);
        assert!(text.starts_with("cursor: 1 created, 0 overwritten, 0 identical, 0 skipped, 1 differ"));
        assert!(text.contains("  differs: b.mdc"));
        assert!(text.contains("  failed: c.md: boom"));
        assert!(text.contains("  missing: d.mdc"));
        assert!(text.contains("  new (use --force to import): e.mdc"));
    }
}
