// Broken link detection over the template's markdown.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rulebridge_common::links::find_links;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::sync::{discover_rules, MEMORY_BANK_DIR};

const UNCHECKED_SCHEMES: [&str; 3] = ["http:", "https:", "mailto:"];

#[derive(Debug, Clone, Serialize)]
pub struct BrokenLink {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub target: String,
}

#[derive(Debug, Default, Serialize)]
pub struct LintReport {
    pub files_checked: usize,
    pub links_checked: usize,
    pub broken: Vec<BrokenLink>,
}

/// Check every link in the rules and memory-bank markdown. Relative targets
/// resolve against the template root.
pub fn lint(template_root: &Path, config: &Config) -> Result<LintReport> {
    let mut report = LintReport::default();

    let mut files = discover_rules(&config.rules_root(template_root))?;
    let memory_bank = template_root.join(MEMORY_BANK_DIR);
    if memory_bank.is_dir() {
        files.extend(discover_rules(&memory_bank)?);
    }

    for file in files {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read `{}`", file.display()))?;
        report.files_checked += 1;

        for link in find_links(&content) {
            let Some(target_path) = checkable_path(&link.target) else {
                continue;
            };
            report.links_checked += 1;
            if !template_root.join(target_path).exists() {
                debug!(path = %file.display(), target = %link.target, "broken link");
                report.broken.push(BrokenLink {
                    path: file.clone(),
                    line: link.line,
                    column: link.column,
                    target: link.target,
                });
            }
        }
    }

    Ok(report)
}

/// File part of a link target, or `None` for targets that are not local files.
fn checkable_path(target: &str) -> Option<&str> {
    let target = target.trim();
    if target.is_empty() || target.starts_with('#') {
        return None;
    }
    let lower = target.to_ascii_lowercase();
    if UNCHECKED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }
    let path = target.split(['#', '?']).next().unwrap_or(target);
    (!path.is_empty()).then_some(path)
}

impl BrokenLink {
    pub fn render(&self) -> String {
        format!("{}:{}:{}: broken link: {}", self.path.display(), self.line, self.column, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn reports_broken_links_with_positions() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(
            dir.path(),
            "rules/a.md",
            "# A\n\nSee [b](rules/b.md) and [gone](rules/missing.md#top).\n",
        );
        write(dir.path(), "rules/b.md", "Back to [a](rules/a.md), [web](https://example.com), [top](#a).\n");
        write(dir.path(), "memory-bank/notes.md", "[ghost](memory-bank/ghost.md)\n");

        let report = lint(dir.path(), &Config::default()).unwrap();

        assert_eq!(report.files_checked, 3);
        assert_eq!(report.links_checked, 4);
        assert_eq!(report.broken.len(), 2);

        let first = &report.broken[0];
        assert!(first.path.ends_with("rules/a.md"));
        assert_eq!((first.line, first.column), (3, 25));
        assert_eq!(first.target, "rules/missing.md#top");
        assert!(first.render().ends_with("rules/a.md:3:25: broken link: rules/missing.md#top"));

        assert!(report.broken[1].path.ends_with("memory-bank/notes.md"));
    }

    #[test]
    fn clean_tree_has_no_broken_links() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "rules/a.md", "[self](rules/a.md)\n");
        let report = lint(dir.path(), &Config::default()).unwrap();
        assert!(report.broken.is_empty());
        assert_eq!(report.links_checked, 1);
    }

    #[test]
    fn unchecked_targets() {
        assert_eq!(checkable_path("https://example.com"), None);
        assert_eq!(checkable_path("MAILTO:someone@example.com"), None);
        assert_eq!(checkable_path("#section"), None);
        assert_eq!(checkable_path("rules/a.md#part"), Some("rules/a.md"));
        assert_eq!(checkable_path("memory-bank/x.md"), Some("memory-bank/x.md"));
    }
}
