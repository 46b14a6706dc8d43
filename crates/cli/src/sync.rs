// Sync orchestration between a template's canonical rules and a project's
// editor rule trees.
//
// The transforms themselves live in `rulebridge_common`; this module walks
// the trees, applies the write policy and records what happened per file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rulebridge_common::aggregate::{self, OutputTarget, SourceDocument};
use rulebridge_common::editor::{self, Editor};
use rulebridge_common::frontmatter::RuleHeader;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;

pub const README: &str = "README.md";
pub const LLM_README: &str = "LLM-README.md";
pub const MEMORY_BANK_DIR: &str = "memory-bank";
const CANONICAL_EXTENSION: &str = "md";

/// What to do when a target already exists with different content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub force: bool,
    pub compare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Created,
    Identical,
    Overwritten,
    /// Content differs and was reported, not written.
    Differs,
    Skipped,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Identical => "identical",
            Self::Overwritten => "overwritten",
            Self::Differs => "differs",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub files: Vec<FileOutcome>,
    pub failures: Vec<Failure>,
    /// Expected files that do not exist on the source side.
    pub missing: Vec<PathBuf>,
    /// Editor files without a canonical counterpart, left alone without `--force`.
    pub new_files: Vec<PathBuf>,
}

impl SyncReport {
    pub fn count(&self, disposition: Disposition) -> usize {
        self.files.iter().filter(|file| file.disposition == disposition).count()
    }

    fn record(&mut self, path: PathBuf, disposition: Disposition) {
        self.files.push(FileOutcome { path, disposition });
    }

    fn fail(&mut self, path: &Path, error: impl std::fmt::Display) {
        warn!(path = %path.display(), %error, "document skipped");
        self.failures.push(Failure { path: path.to_path_buf(), error: error.to_string() });
    }
}

/// All `*.md` files under `root`, recursively, in sorted order.
pub fn discover_rules(root: &Path) -> Result<Vec<PathBuf>> {
    collect_files(root, Some(CANONICAL_EXTENSION))
}

/// Files under `root` with the given extension, or every file for `None`.
fn collect_files(root: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, extension: Option<&str>, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory `{}`", dir.display()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("failed to iterate directory `{}`", dir.display()))?;

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, extension, out)?;
        } else if extension.is_none() || path.extension().and_then(|value| value.to_str()) == extension {
            out.push(path);
        }
    }
    Ok(())
}

/// Write `content` to `target` unless the policy says otherwise.
pub fn write_with_policy(
    target: &Path,
    content: impl AsRef<[u8]>,
    policy: Policy,
) -> Result<Disposition> {
    let content = content.as_ref();
    if !target.exists() {
        write_file(target, content)?;
        info!(path = %target.display(), "created");
        return Ok(Disposition::Created);
    }

    let existing = fs::read(target)
        .with_context(|| format!("failed to read existing file `{}`", target.display()))?;
    if existing == content {
        debug!(path = %target.display(), "identical, skipping");
        return Ok(Disposition::Identical);
    }

    if policy.force {
        write_file(target, content)?;
        info!(path = %target.display(), "overwritten");
        Ok(Disposition::Overwritten)
    } else if policy.compare {
        warn!(path = %target.display(), "differs from generated content");
        Ok(Disposition::Differs)
    } else {
        info!(path = %target.display(), "differs, skipping (use --force or --compare)");
        Ok(Disposition::Skipped)
    }
}

fn write_file(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory `{}`", parent.display()))?;
    }
    fs::write(target, content).with_context(|| format!("failed to write `{}`", target.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))
}

fn relative<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root)
        .with_context(|| format!("`{}` is not under `{}`", path.display(), root.display()))
}

fn is_readme(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == README)
}

/// Canonical rules → `<project>/<editor rules dir>`.
pub fn push(
    template_root: &Path,
    project_root: &Path,
    editor: Editor,
    policy: Policy,
    config: &Config,
) -> Result<SyncReport> {
    let rules_root = config.rules_root(template_root);
    let profile = editor.profile();
    let target_root = project_root.join(profile.rules_dir());
    let mut report = SyncReport::default();

    info!(editor = %editor, from = %rules_root.display(), to = %target_root.display(), "push");

    for source in discover_rules(&rules_root)? {
        let rel = relative(&source, &rules_root)?;
        let content = read(&source)?;

        if is_readme(&source) {
            let target = target_root.join(rel);
            let copy_policy = Policy { force: policy.force, compare: false };
            let disposition = write_with_policy(&target, &content, copy_policy)?;
            report.record(target, disposition);
            continue;
        }

        let target = target_root.join(rel).with_extension(profile.extension());
        match editor::to_editor_format(editor, &content) {
            Ok(rendered) => {
                let disposition = write_with_policy(&target, &rendered, policy)?;
                report.record(target, disposition);
            }
            Err(error) => report.fail(&source, error),
        }
    }

    push_memory_bank(template_root, project_root, policy, &mut report)?;

    let readme = template_root.join(LLM_README);
    if readme.is_file() {
        let target = project_root.join(LLM_README);
        let disposition = write_with_policy(&target, read_bytes(&readme)?, policy)?;
        report.record(target, disposition);
    }

    Ok(report)
}

/// Copy `<template>/memory-bank` into the project. A project without one gets
/// the whole tree; otherwise only missing files are added, and only with
/// `force`. Files the project already has are never touched.
fn push_memory_bank(
    template_root: &Path,
    project_root: &Path,
    policy: Policy,
    report: &mut SyncReport,
) -> Result<()> {
    let source_root = template_root.join(MEMORY_BANK_DIR);
    if !source_root.is_dir() {
        return Ok(());
    }
    let target_root = project_root.join(MEMORY_BANK_DIR);
    let fresh = !target_root.exists();

    for source in collect_files(&source_root, None)? {
        let target = target_root.join(relative(&source, &source_root)?);
        if target.exists() {
            debug!(path = %target.display(), "memory-bank file already present");
            continue;
        }
        if fresh || policy.force {
            let disposition = write_with_policy(&target, read_bytes(&source)?, policy)?;
            report.record(target, disposition);
        } else {
            info!(path = %target.display(), "missing memory-bank file, skipping (use --force to copy)");
            report.record(target, Disposition::Skipped);
        }
    }
    Ok(())
}

/// `<project>/<editor rules dir>` → canonical rules.
pub fn pull(
    template_root: &Path,
    project_root: &Path,
    editor: Editor,
    policy: Policy,
    config: &Config,
) -> Result<SyncReport> {
    let rules_root = config.rules_root(template_root);
    let profile = editor.profile();
    let project_root = fs::canonicalize(project_root)
        .with_context(|| format!("project directory `{}` not found", project_root.display()))?;
    let editor_root = project_root.join(profile.rules_dir());
    let basename = project_root.file_name().map(|name| name.to_string_lossy().into_owned());
    let mut report = SyncReport::default();

    info!(editor = %editor, from = %editor_root.display(), to = %rules_root.display(), "pull");

    for canonical in discover_rules(&rules_root)? {
        if is_readme(&canonical) {
            continue;
        }
        let rel = relative(&canonical, &rules_root)?;
        let editor_file = editor_root.join(rel).with_extension(profile.extension());
        if !editor_file.exists() {
            warn!(path = %editor_file.display(), "missing editor file");
            report.missing.push(editor_file);
            continue;
        }

        let master = read(&canonical)?;
        let (master_header, _) = RuleHeader::parse(&master);
        let content = read(&editor_file)?;
        match editor::from_editor_format(
            editor,
            &content,
            basename.as_deref(),
            master_header.description.as_deref(),
        ) {
            Ok(rendered) => {
                let disposition = write_with_policy(&canonical, &rendered, policy)?;
                report.record(canonical, disposition);
            }
            Err(error) => report.fail(&editor_file, error),
        }
    }

    if editor_root.is_dir() {
        import_new_files(
            &editor_root,
            &rules_root,
            editor,
            basename.as_deref(),
            policy,
            config,
            &mut report,
        )?;
    }

    let readme = project_root.join(profile.editor_dir()).join(LLM_README);
    if readme.is_file() {
        let target = template_root.join(LLM_README);
        let disposition = write_with_policy(&target, read_bytes(&readme)?, policy)?;
        report.record(target, disposition);
    }

    Ok(report)
}

fn import_new_files(
    editor_root: &Path,
    rules_root: &Path,
    editor: Editor,
    basename: Option<&str>,
    policy: Policy,
    config: &Config,
    report: &mut SyncReport,
) -> Result<()> {
    for editor_file in collect_files(editor_root, Some(editor.profile().extension()))? {
        if is_readme(&editor_file) {
            continue;
        }
        let rel = relative(&editor_file, editor_root)?;
        let skipped = rel
            .components()
            .any(|component| config.skip_dirs.iter().any(|dir| component.as_os_str() == dir.as_str()));
        if skipped {
            debug!(path = %editor_file.display(), "in skipped directory");
            continue;
        }

        let canonical = rules_root.join(rel).with_extension(CANONICAL_EXTENSION);
        if canonical.exists() {
            continue;
        }
        if !policy.force {
            info!(path = %editor_file.display(), "new file, skipping (use --force to import)");
            report.new_files.push(editor_file);
            continue;
        }

        let content = read(&editor_file)?;
        match editor::from_editor_format(editor, &content, basename, None) {
            Ok(rendered) => {
                let disposition = write_with_policy(&canonical, &rendered, policy)?;
                report.record(canonical, disposition);
            }
            Err(error) => report.fail(&editor_file, error),
        }
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct SingleFileReport {
    pub files: Vec<FileOutcome>,
}

/// Aggregate the canonical rules once per target into `project_root`.
pub fn single_file(
    template_root: &Path,
    project_root: &Path,
    targets: &[OutputTarget],
    config: &Config,
) -> Result<SingleFileReport> {
    let rules_root = config.rules_root(template_root);
    let documents = discover_rules(&rules_root)?
        .into_iter()
        .map(|path| Ok(SourceDocument { content: read(&path)?, path }))
        .collect::<Result<Vec<_>>>()?;

    let overwrite = Policy { force: true, compare: false };
    let mut report = SingleFileReport::default();

    for target in targets {
        let aggregation = aggregate::aggregate(&documents, target)
            .with_context(|| format!("failed to build {}", target.file_name))?;

        let main_path = project_root.join(&target.file_name);
        let disposition = write_with_policy(&main_path, &aggregation.main, overwrite)?;
        report.files.push(FileOutcome { path: main_path, disposition });

        for (section, content) in &aggregation.sections {
            let path = project_root.join(section).join(&target.file_name);
            let disposition = write_with_policy(&path, content, overwrite)?;
            report.files.push(FileOutcome { path, disposition });
        }
    }

    Ok(report)
}
