// Markdown link target rewriting between canonical and editor path conventions.
//
// Canonical targets:
// - rules/<path>.md
// - memory-bank/<path>
//
// Only the `(...)` target of an inline `[label](target)` link is rewritten.

use std::sync::OnceLock;

use pulldown_cmark::{Event, LinkType, Parser, Tag};
use regex::{Captures, Regex};

pub const CANONICAL_RULES_PREFIX: &str = "rules/";
pub const CANONICAL_MEMORY_BANK_PREFIX: &str = "memory-bank/";

pub const CURSOR_RULES_PREFIX: &str = "mdc:.cursor/rules/";
const CURSOR_SCHEME: &str = "mdc:";
const CURSOR_RULES_DIR: &str = ".cursor/rules/";
pub const CURSOR_MEMORY_BANK_PREFIX: &str = "mdc:memory-bank/";
pub const CURSOR_PLACEHOLDER: &str = "CURSOR_RULE_PLACEHOLDER_";

pub const WINDSURF_RULES_PREFIX: &str = ".windsurf/rules/";
pub const WINDSURF_MEMORY_BANK_PREFIX: &str = ".windsurf/memory-bank/";
pub const WINDSURF_PLACEHOLDER: &str = "WINDSURF_RULE_PLACEHOLDER_";

fn inline_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("inline link pattern should compile")
    })
}

fn rule_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\(rules/[^)]+\)").expect("rule link pattern should compile")
    })
}

/// Apply `rewrite` to every inline link target. Targets for which `rewrite`
/// returns `None` are left untouched.
pub fn rewrite_link_targets<F>(markdown: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    inline_link_pattern()
        .replace_all(markdown, |captures: &Captures<'_>| {
            let label = &captures[1];
            let target = &captures[2];
            match rewrite(target) {
                Some(rewritten) => format!("[{label}]({rewritten})"),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace every occurrence of an editor placeholder token with its prefix.
pub fn resolve_placeholders(body: &str, token: &str, prefix: &str) -> String {
    body.replace(token, prefix)
}

/// `rules/X.md` → `mdc:.cursor/rules/X.mdc`, `memory-bank/…` → `mdc:memory-bank/…`.
pub fn cursor_forward_target(target: &str) -> Option<String> {
    if let Some(stem) = canonical_rule_stem(target) {
        return Some(format!("{CURSOR_RULES_PREFIX}{stem}.mdc"));
    }
    target
        .strip_prefix(CANONICAL_MEMORY_BANK_PREFIX)
        .map(|rest| format!("{CURSOR_MEMORY_BANK_PREFIX}{rest}"))
}

/// Inverse of [`cursor_forward_target`]. Accepts targets with or without the
/// `mdc:` scheme. A leading `<project_basename>/` segment is dropped when a
/// basename is supplied.
///
/// Only `mdc:` targets and bare `.cursor/rules/` paths are rewritten; URLs
/// and other relative links come back as `None`.
pub fn cursor_reverse_target(target: &str, project_basename: Option<&str>) -> Option<String> {
    let (mut inner, had_scheme) = match target.strip_prefix(CURSOR_SCHEME) {
        Some(rest) => (rest, true),
        None => (target, false),
    };
    if has_url_scheme(inner) || !(had_scheme || inner.starts_with(CURSOR_RULES_DIR)) {
        return None;
    }
    if let Some(basename) = project_basename.filter(|basename| !basename.is_empty()) {
        if let Some(rest) = inner.strip_prefix(basename).and_then(|rest| rest.strip_prefix('/')) {
            inner = rest;
        }
    }

    let mut rewritten = inner.replacen(CURSOR_RULES_DIR.trim_end_matches('/'), "rules", 1);
    if let Some(stem) = rewritten.strip_suffix(".mdc") {
        rewritten = format!("{stem}.md");
    }

    (rewritten != target).then_some(rewritten)
}

/// `rules/X.md` → `.windsurf/rules/X.md`, `memory-bank/…` → `.windsurf/memory-bank/…`.
pub fn windsurf_forward_target(target: &str) -> Option<String> {
    if canonical_rule_stem(target).is_some() {
        let rest = &target[CANONICAL_RULES_PREFIX.len()..];
        return Some(format!("{WINDSURF_RULES_PREFIX}{rest}"));
    }
    target
        .strip_prefix(CANONICAL_MEMORY_BANK_PREFIX)
        .map(|rest| format!("{WINDSURF_MEMORY_BANK_PREFIX}{rest}"))
}

/// Inverse of [`windsurf_forward_target`].
pub fn windsurf_reverse_target(target: &str) -> Option<String> {
    if let Some(rest) = target.strip_prefix(WINDSURF_RULES_PREFIX) {
        return Some(format!("{CANONICAL_RULES_PREFIX}{rest}"));
    }
    target
        .strip_prefix(WINDSURF_MEMORY_BANK_PREFIX)
        .map(|rest| format!("{CANONICAL_MEMORY_BANK_PREFIX}{rest}"))
}

/// `[label](rules/…)` → `**label**`. Used when rules are folded into a single
/// file where cross-rule links have nowhere to point.
pub fn strip_rule_links(body: &str) -> String {
    rule_link_pattern().replace_all(body, "**$1**").into_owned()
}

/// `scheme:` per RFC 3986: a letter, then letters, digits, `+`, `-` or `.`.
fn has_url_scheme(target: &str) -> bool {
    target.split_once(':').is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn canonical_rule_stem(target: &str) -> Option<&str> {
    target
        .strip_prefix(CANONICAL_RULES_PREFIX)
        .and_then(|rest| rest.strip_suffix(".md"))
        .filter(|stem| !stem.is_empty())
}

/// A link found in markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    pub target: String,
    /// 1-based line of the opening `[`.
    pub line: usize,
    /// 1-based character column of the opening `[`.
    pub column: usize,
}

/// Collect link targets from markdown, skipping images, autolinks, and
/// anything inside code.
pub fn find_links(markdown: &str) -> Vec<MarkdownLink> {
    let mut links = Vec::new();

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        let Event::Start(Tag::Link { link_type, dest_url, .. }) = event else {
            continue;
        };
        if matches!(link_type, LinkType::Autolink | LinkType::Email) {
            continue;
        }

        let (line, column) = line_and_column(markdown, range.start);
        links.push(MarkdownLink { target: dest_url.to_string(), line, column });
    }

    links
}

fn line_and_column(markdown: &str, offset: usize) -> (usize, usize) {
    let before = &markdown[..offset];
    let line = before.bytes().filter(|byte| *byte == b'\n').count() + 1;
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let column = markdown[line_start..offset].chars().count() + 1;
    (line, column)
}
